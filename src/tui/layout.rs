//! Root layout: tab bar + main content + status bar.

use ratatui::layout::{Constraint, Layout, Rect};

/// Below this width the detail page stacks its sections in one column.
pub const TWO_COLUMN_THRESHOLD: u16 = 90;

/// Computed layout regions for a single frame.
pub struct AppLayout {
    /// Tab bar (top row).
    pub tabs: Rect,
    /// Main content area.
    pub main: Rect,
    /// Status bar (bottom row).
    pub status: Rect,
}

impl AppLayout {
    pub fn compute(area: Rect) -> Self {
        let rows = Layout::vertical([
            Constraint::Length(1), // Tabs
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        AppLayout {
            tabs: rows[0],
            main: rows[1],
            status: rows[2],
        }
    }
}

/// Split the detail page into the summary/risks row and the entities/text
/// row. Returns `[summary, risks, entities, full_text]`.
pub fn detail_grid(area: Rect) -> [Rect; 4] {
    if area.width < TWO_COLUMN_THRESHOLD {
        let rows = Layout::vertical([
            Constraint::Percentage(20),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(30),
        ])
        .split(area);
        return [rows[0], rows[1], rows[2], rows[3]];
    }

    let rows = Layout::vertical([Constraint::Percentage(45), Constraint::Percentage(55)]).split(area);
    let top = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(rows[0]);
    let bottom =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(rows[1]);
    [top[0], top[1], bottom[0], bottom[1]]
}
