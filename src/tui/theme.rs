//! Indigo & slate colour theme for the legalmate TUI.
//!
//! All colour constants are RGB truecolor. Views import from here
//! instead of using inline `Color::*` literals.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders};

use crate::core::api::Severity;

// ── Primary palette ─────────────────────────────────────────────────────────

/// Indigo: primary accent, focused borders, entity headings.
pub const PRIMARY: Color = Color::Rgb(0x4F, 0x46, 0xE5);
/// Light indigo: hints, entity values.
pub const PRIMARY_LIGHT: Color = Color::Rgb(0x81, 0x8C, 0xF8);

// ── Accent ──────────────────────────────────────────────────────────────────

/// Amber: titles, calls to action.
pub const ACCENT: Color = Color::Rgb(0xF5, 0x9E, 0x0B);

// ── Backgrounds ─────────────────────────────────────────────────────────────

/// Slate: base background.
pub const BG_BASE: Color = Color::Rgb(0x0F, 0x17, 0x2A);

// ── Text ────────────────────────────────────────────────────────────────────

pub const TEXT: Color = Color::Rgb(0xE2, 0xE8, 0xF0);
/// Secondary labels, dates.
pub const TEXT_MUTED: Color = Color::Rgb(0x94, 0xA3, 0xB8);
/// Disabled items, faint hints.
pub const TEXT_DIM: Color = Color::Rgb(0x47, 0x55, 0x69);

// ── Semantic ────────────────────────────────────────────────────────────────

pub const ERROR: Color = Color::Rgb(0xEF, 0x44, 0x44);
pub const SUCCESS: Color = Color::Rgb(0x22, 0xC5, 0x5E);
pub const WARNING: Color = Color::Rgb(0xF9, 0x73, 0x16);
pub const INFO: Color = Color::Rgb(0x38, 0xBD, 0xF8);

/// Bar colour for a risk severity.
pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::High => ERROR,
        Severity::Medium => WARNING,
        Severity::Low => ACCENT,
        Severity::Unknown => TEXT_MUTED,
    }
}

// ── Style helpers ───────────────────────────────────────────────────────────

/// Bold accent text (titles, active items).
pub fn title() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

/// Section header style.
pub fn heading() -> Style {
    Style::default().fg(PRIMARY_LIGHT).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(PRIMARY)
}

pub fn border_default() -> Style {
    Style::default().fg(TEXT_DIM)
}

/// Selected list item.
pub fn highlight() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn muted() -> Style {
    Style::default().fg(TEXT_MUTED)
}

pub fn error() -> Style {
    Style::default().fg(ERROR)
}

/// Key hint style (e.g., "q:quit").
pub fn key_hint() -> Style {
    Style::default().fg(TEXT_DIM)
}

/// Status bar brand badge.
pub fn brand_badge() -> Style {
    Style::default()
        .fg(BG_BASE)
        .bg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

/// Path-editing badge.
pub fn insert_badge() -> Style {
    Style::default()
        .fg(BG_BASE)
        .bg(PRIMARY_LIGHT)
        .add_modifier(Modifier::BOLD)
}

// ── Block builders ──────────────────────────────────────────────────────────

pub fn block_focused(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(border_focused())
}

pub fn block_default(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(border_default())
}

/// Red-bordered block for a section that failed to render.
pub fn block_fault(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ERROR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_colors_are_distinct() {
        let colors = [
            severity_color(Severity::High),
            severity_color(Severity::Medium),
            severity_color(Severity::Low),
            severity_color(Severity::Unknown),
        ];
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_style_helpers_return_non_default() {
        assert_ne!(title(), Style::default());
        assert_ne!(heading(), Style::default());
        assert_ne!(highlight(), Style::default());
        assert_ne!(error(), Style::default());
    }
}
