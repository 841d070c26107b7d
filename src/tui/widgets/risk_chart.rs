//! Horizontal bar chart of risks per category, coloured by severity.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::Widget,
};

use crate::core::sections::RiskBar;
use crate::tui::theme;

const BAR_CHAR: &str = "█";
const MAX_LABEL_WIDTH: usize = 24;

/// ```ignore
/// frame.render_widget(RiskChart::new(&bars), area);
/// ```
pub struct RiskChart<'a> {
    bars: &'a [RiskBar],
}

impl<'a> RiskChart<'a> {
    pub fn new(bars: &'a [RiskBar]) -> Self {
        Self { bars }
    }

    fn label_width(&self) -> usize {
        self.bars
            .iter()
            .map(|b| b.category.chars().count())
            .max()
            .unwrap_or(0)
            .min(MAX_LABEL_WIDTH)
    }
}

/// Scale `count` to at most `width` cells; any non-zero count gets one cell.
fn bar_len(count: usize, max: usize, width: usize) -> usize {
    if max == 0 || count == 0 {
        return 0;
    }
    ((count * width) / max).max(1)
}

fn truncate(label: &str, width: usize) -> String {
    if label.chars().count() <= width {
        return format!("{label:<width$}");
    }
    let mut out: String = label.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

impl Widget for RiskChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let label_width = self.label_width();
        let max = self.bars.iter().map(|b| b.count).max().unwrap_or(0);
        // label + space + bar + space + count
        let count_width = max.to_string().len();
        let bar_width = (area.width as usize).saturating_sub(label_width + count_width + 2);

        for (i, bar) in self.bars.iter().take(area.height as usize).enumerate() {
            let y = area.y + i as u16;
            let mut x = area.x;
            let max_x = area.x + area.width;

            let label = truncate(&bar.category, label_width);
            buf.set_stringn(x, y, &label, (max_x - x) as usize, Style::default().fg(theme::TEXT));
            x = x.saturating_add(label_width as u16 + 1);
            if x >= max_x {
                continue;
            }

            let len = bar_len(bar.count, max, bar_width);
            let style = Style::default().fg(theme::severity_color(bar.severity));
            buf.set_stringn(x, y, BAR_CHAR.repeat(len), (max_x - x) as usize, style);
            x = x.saturating_add(len as u16 + 1);
            if x >= max_x {
                continue;
            }

            buf.set_stringn(x, y, bar.count.to_string(), (max_x - x) as usize, theme::muted());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::api::Severity;

    fn render_rows(bars: &[RiskBar], width: u16, height: u16) -> Vec<String> {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        RiskChart::new(bars).render(area, &mut buf);
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buf.cell((x, y)).map_or(" ", |c| c.symbol()).to_string())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    fn bar(category: &str, count: usize, severity: Severity) -> RiskBar {
        RiskBar {
            category: category.to_string(),
            count,
            severity,
        }
    }

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar_len(4, 4, 20), 20);
        assert_eq!(bar_len(1, 4, 20), 5);
        assert_eq!(bar_len(1, 100, 20), 1);
        assert_eq!(bar_len(0, 4, 20), 0);
    }

    #[test]
    fn test_renders_labels_and_counts() {
        let bars = vec![
            bar("Liability", 2, Severity::High),
            bar("Termination", 1, Severity::Medium),
        ];
        let rows = render_rows(&bars, 40, 3);
        assert!(rows[0].starts_with("Liability"));
        assert!(rows[0].ends_with('2'));
        assert!(rows[1].starts_with("Termination"));
        assert!(rows[2].is_empty());

        let first = rows[0].matches('█').count();
        let second = rows[1].matches('█').count();
        assert!(first > second && second > 0);
    }

    #[test]
    fn test_long_labels_are_truncated() {
        let bars = vec![bar(
            "Indemnification And Hold Harmless Obligations",
            1,
            Severity::Low,
        )];
        let rows = render_rows(&bars, 40, 1);
        assert!(rows[0].contains('…'));
    }

    #[test]
    fn test_empty_area_is_noop() {
        let bars = vec![bar("Liability", 1, Severity::High)];
        let area = Rect::new(0, 0, 0, 0);
        let mut buf = Buffer::empty(area);
        RiskChart::new(&bars).render(area, &mut buf);
    }
}
