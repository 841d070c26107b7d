/// LegalMate - terminal client for AI-powered legal document analysis.
///
/// Wraps the document analysis HTTP API (upload, list, detail, delete) in
/// client-side workflows and renders the results in a ratatui TUI.

pub mod config;
pub mod core;
pub mod tui;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
