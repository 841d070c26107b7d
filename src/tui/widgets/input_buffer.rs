//! Single-line text field used for the upload path.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::theme;

/// Text plus a byte cursor that always sits on a char boundary.
#[derive(Debug, Default)]
pub struct InputBuffer {
    content: String,
    cursor: usize,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn prev_boundary(&self) -> usize {
        self.content[..self.cursor]
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i)
    }

    fn next_boundary(&self) -> usize {
        self.content[self.cursor..]
            .chars()
            .next()
            .map_or(self.content.len(), |c| self.cursor + c.len_utf8())
    }

    pub fn insert_char(&mut self, c: char) {
        self.content.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Insert pasted text, dropping line breaks.
    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars().filter(|c| *c != '\n' && *c != '\r') {
            self.insert_char(c);
        }
    }

    pub fn backspace(&mut self) {
        let prev = self.prev_boundary();
        self.content.drain(prev..self.cursor);
        self.cursor = prev;
    }

    pub fn delete(&mut self) {
        let next = self.next_boundary();
        self.content.drain(self.cursor..next);
    }

    pub fn move_left(&mut self) {
        self.cursor = self.prev_boundary();
    }

    pub fn move_right(&mut self) {
        self.cursor = self.next_boundary();
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.content.len();
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    pub fn text(&self) -> &str {
        &self.content
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor
    }

    /// Render as one line. With `editing`, the char under the cursor is
    /// shown reversed; an empty field shows `placeholder`.
    pub fn to_line<'a>(&'a self, placeholder: &'a str, editing: bool) -> Line<'a> {
        if self.content.is_empty() && !editing {
            return Line::from(Span::styled(placeholder, theme::muted()));
        }
        let text = Style::default().fg(theme::TEXT);
        if !editing {
            return Line::from(Span::styled(self.content.as_str(), text));
        }

        let cursor_style = Style::default().add_modifier(Modifier::REVERSED);
        let next = self.next_boundary();
        let under = if next > self.cursor {
            &self.content[self.cursor..next]
        } else {
            " "
        };
        Line::from(vec![
            Span::styled(&self.content[..self.cursor], text),
            Span::styled(under, cursor_style),
            Span::styled(&self.content[next..], text),
        ])
    }
}
