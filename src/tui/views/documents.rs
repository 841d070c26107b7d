//! Paginated document list.

use std::sync::Arc;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::core::api::{ApiError, DocumentPage, DocumentSummary};
use crate::core::workflow::{ListState, ListWorkflow, PageTicket, Route};

use super::super::events::{AppEvent, ViewInput};
use super::super::services::Services;
use super::super::theme;

/// Rows per document card (filename, meta line, spacer).
const CARD_HEIGHT: usize = 3;

pub struct DocumentsViewState {
    workflow: ListWorkflow,
    selected: usize,
}

impl DocumentsViewState {
    pub fn new() -> Self {
        Self {
            workflow: ListWorkflow::new(),
            selected: 0,
        }
    }

    pub fn workflow(&self) -> &ListWorkflow {
        &self.workflow
    }

    /// (Re)load the current page.
    pub fn load(&mut self, services: &Services) {
        let ticket = self.workflow.reload();
        spawn_fetch(ticket, services);
    }

    pub fn on_page_loaded(&mut self, ticket: PageTicket, result: Result<DocumentPage, ApiError>) {
        if self.workflow.apply(ticket, result) {
            self.selected = 0;
        }
    }

    fn selected_document(&self) -> Option<&DocumentSummary> {
        self.workflow.documents().get(self.selected)
    }

    pub fn handle_input(&mut self, event: &Event, services: &Services) -> ViewInput {
        let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return ViewInput::Ignored;
        };

        match code {
            KeyCode::Char('j') | KeyCode::Down => {
                let len = self.workflow.documents().len();
                if self.selected + 1 < len {
                    self.selected += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Char('n') | KeyCode::Right | KeyCode::PageDown => {
                if let Some(ticket) = self.workflow.next_page() {
                    spawn_fetch(ticket, services);
                }
            }
            KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => {
                if let Some(ticket) = self.workflow.prev_page() {
                    spawn_fetch(ticket, services);
                }
            }
            KeyCode::Char('r') => self.load(services),
            KeyCode::Enter => {
                return match self.selected_document() {
                    Some(doc) => ViewInput::Navigate(Route::Document(doc.id.clone())),
                    None => ViewInput::Consumed,
                };
            }
            _ => return ViewInput::Ignored,
        }
        ViewInput::Consumed
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = theme::block_focused("Your Documents");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);

        match self.workflow.state() {
            ListState::Loading { page } => {
                frame.render_widget(message(format!("Loading page {page}..."), theme::muted()), rows[0]);
            }
            ListState::Failed { message: text, .. } => {
                frame.render_widget(message(text.clone(), theme::error()), rows[0]);
            }
            ListState::Loaded { documents, .. } if documents.is_empty() => {
                frame.render_widget(
                    message("No documents uploaded yet. Press 1 to upload.".to_string(), theme::muted()),
                    rows[0],
                );
            }
            ListState::Loaded { documents, .. } => {
                self.render_cards(frame, rows[0], documents);
            }
        }

        frame.render_widget(Paragraph::new(self.pager_line()), rows[1]);
    }

    fn render_cards(&self, frame: &mut Frame, area: Rect, documents: &[DocumentSummary]) {
        let mut lines = Vec::with_capacity(documents.len() * CARD_HEIGHT);
        for (i, doc) in documents.iter().enumerate() {
            let selected = i == self.selected;
            let marker = if selected { "▸ " } else { "  " };
            let name_style = if selected {
                theme::highlight()
            } else {
                Style::default().fg(theme::TEXT).add_modifier(Modifier::BOLD)
            };
            lines.push(Line::from(vec![
                Span::styled(marker, Style::default().fg(theme::ACCENT)),
                Span::styled(display_name(doc), name_style),
            ]));
            lines.push(Line::from(vec![
                Span::raw("    "),
                Span::styled(format!("Uploaded: {}", format_date(doc)), theme::muted()),
                Span::raw("  "),
                status_span(doc.status.as_deref()),
            ]));
            lines.push(Line::raw(""));
        }

        // Keep the selected card visible
        let visible_cards = (area.height as usize / CARD_HEIGHT).max(1);
        let first = self.selected.saturating_sub(visible_cards - 1);
        let scroll = (first * CARD_HEIGHT) as u16;
        frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), area);
    }

    fn pager_line(&self) -> Line<'_> {
        let page = self.workflow.page();
        let total = self.workflow.total_pages();
        let prev_style = if page > 1 { theme::heading() } else { theme::key_hint() };
        let next_style = if page < total { theme::heading() } else { theme::key_hint() };
        Line::from(vec![
            Span::styled(" ◂ p ", prev_style),
            Span::styled(format!(" Page {page} of {total} "), theme::muted()),
            Span::styled(" n ▸ ", next_style),
            Span::raw("   "),
            Span::styled("Enter", theme::key_hint()),
            Span::raw(":open "),
            Span::styled("r", theme::key_hint()),
            Span::raw(":refresh"),
        ])
    }
}

impl Default for DocumentsViewState {
    fn default() -> Self {
        Self::new()
    }
}

fn spawn_fetch(ticket: PageTicket, services: &Services) {
    let api = Arc::clone(&services.api);
    let tx = services.event_tx.clone();
    tokio::spawn(async move {
        let result = api.list_documents(ticket.page).await;
        let _ = tx.send(AppEvent::PageLoaded { ticket, result });
    });
}

fn message(text: String, style: Style) -> Paragraph<'static> {
    Paragraph::new(vec![
        Line::raw(""),
        Line::from(vec![Span::raw("  "), Span::styled(text, style)]),
    ])
}

fn display_name(doc: &DocumentSummary) -> &str {
    if doc.filename.trim().is_empty() {
        doc.id.as_str()
    } else {
        &doc.filename
    }
}

fn format_date(doc: &DocumentSummary) -> String {
    doc.upload_date
        .map(|d| d.format("%b %-d, %Y %H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn status_span(status: Option<&str>) -> Span<'static> {
    match status {
        Some(s) if s.eq_ignore_ascii_case("processed") => {
            Span::styled("processed", Style::default().fg(theme::SUCCESS))
        }
        Some(s) if s.eq_ignore_ascii_case("failed") => Span::styled("failed", theme::error()),
        Some(s) => Span::styled(s.to_string(), Style::default().fg(theme::WARNING)),
        None => Span::raw(""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::api::DocumentId;
    use chrono::{TimeZone, Utc};

    fn summary(id: &str, filename: &str) -> DocumentSummary {
        DocumentSummary {
            id: DocumentId::new(id),
            filename: filename.to_string(),
            upload_date: Some(Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap()),
            status: Some("processed".to_string()),
        }
    }

    #[test]
    fn test_stale_page_keeps_selection() {
        let mut view = DocumentsViewState::new();
        let old = view.workflow.request(2);
        let new = view.workflow.request(1);
        view.on_page_loaded(
            new,
            Ok(DocumentPage {
                documents: vec![summary("a", "a.pdf"), summary("b", "b.pdf")],
                total: 2,
            }),
        );
        view.selected = 1;
        view.on_page_loaded(
            old,
            Ok(DocumentPage {
                documents: vec![summary("z", "z.pdf")],
                total: 2,
            }),
        );
        assert_eq!(view.selected, 1);
        assert_eq!(view.selected_document().map(|d| d.id.as_str()), Some("b"));
    }

    #[test]
    fn test_display_helpers() {
        assert_eq!(display_name(&summary("x1", "")), "x1");
        assert_eq!(display_name(&summary("x1", "lease.pdf")), "lease.pdf");
        assert_eq!(format_date(&summary("x1", "")), "Mar 5, 2024 14:30");
    }
}
