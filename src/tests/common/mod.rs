//! Common Test Utilities
//!
//! JSON fixtures shaped like real backend responses, plus helpers for
//! pointing a client at a wiremock server.

pub mod fixtures;

pub use fixtures::*;
