//! Analysis page for one document.
//!
//! Each section is drawn from its [`SectionView`], so a fault in one shows
//! up as a red-bordered box while the others render normally.

use std::sync::Arc;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::core::api::{ApiError, DeleteConfirmation, Document, DocumentId};
use crate::core::sections::{self, SectionView};
use crate::core::workflow::{Confirmation, DetailState, DetailWorkflow, Route};

use super::super::app::centered_rect;
use super::super::events::{AppEvent, ViewInput};
use super::super::layout::detail_grid;
use super::super::services::Services;
use super::super::theme;
use super::super::widgets::risk_chart::RiskChart;

pub const DELETE_PROMPT: &str = "Delete this document? (y/n)";

pub struct DetailViewState {
    workflow: Option<DetailWorkflow>,
    sections: Vec<SectionView>,
    /// Scroll offset for the full-text section.
    text_scroll: u16,
}

impl DetailViewState {
    pub fn new() -> Self {
        Self {
            workflow: None,
            sections: Vec::new(),
            text_scroll: 0,
        }
    }

    pub fn workflow(&self) -> Option<&DetailWorkflow> {
        self.workflow.as_ref()
    }

    /// Start loading `id`, replacing whatever was shown.
    pub fn open(&mut self, id: DocumentId, services: &Services) {
        self.workflow = Some(DetailWorkflow::new(id.clone()));
        self.sections.clear();
        self.text_scroll = 0;
        spawn_fetch(id, services);
    }

    fn reload(&mut self, services: &Services) {
        if let Some(wf) = self.workflow.as_mut() {
            wf.restart();
            self.sections.clear();
            spawn_fetch(wf.id().clone(), services);
        }
    }

    /// Apply a fetch result. Results for a document other than the one
    /// currently open are dropped.
    pub fn on_loaded(&mut self, id: &DocumentId, result: Result<Document, ApiError>) -> Option<Route> {
        let wf = self.workflow.as_mut().filter(|wf| wf.id() == id)?;
        let route = wf.on_loaded(result);
        self.sections = wf.document().map(sections::render_all).unwrap_or_default();
        route
    }

    pub fn on_deleted(
        &mut self,
        id: &DocumentId,
        result: Result<DeleteConfirmation, ApiError>,
    ) -> Option<Route> {
        let wf = self.workflow.as_mut().filter(|wf| wf.id() == id)?;
        wf.on_deleted(result)
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
        let Some(wf) = self.workflow.as_mut() else {
            return ViewInput::Ignored;
        };

        // The prompt swallows everything until answered
        match wf.confirmation() {
            Confirmation::Pending => {
                match code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => {
                        if let Some(id) = wf.answer(true) {
                            spawn_delete(id, services);
                        }
                    }
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                        wf.answer(false);
                    }
                    _ => {}
                }
                return ViewInput::Consumed;
            }
            Confirmation::Deleting => return ViewInput::Consumed,
            Confirmation::None => {}
        }

        match code {
            KeyCode::Char('d') | KeyCode::Delete => {
                wf.request_delete();
            }
            KeyCode::Char('r') => self.reload(services),
            KeyCode::Char('j') | KeyCode::Down => {
                self.text_scroll = self.text_scroll.saturating_add(1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.text_scroll = self.text_scroll.saturating_sub(1);
            }
            KeyCode::Esc | KeyCode::Backspace => return ViewInput::Navigate(Route::Documents),
            _ => return ViewInput::Ignored,
        }
        ViewInput::Consumed
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(wf) = self.workflow.as_ref() else {
            frame.render_widget(theme::block_default("Document"), area);
            return;
        };

        let doc = match wf.state() {
            DetailState::Loading => {
                let block = theme::block_focused("Document");
                let inner = block.inner(area);
                frame.render_widget(block, area);
                frame.render_widget(
                    Paragraph::new(Span::styled("Loading document...", theme::muted())),
                    inner,
                );
                return;
            }
            // Transient: the app navigates away on the same event
            DetailState::NotFound => return,
            DetailState::Loaded(doc) => doc,
        };

        let rows = Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).split(area);
        self.render_header(frame, rows[0], wf, doc);

        let cells = detail_grid(rows[1]);
        for (view, cell) in self.sections.iter().zip(cells) {
            self.render_section(frame, cell, view);
        }

        if wf.confirmation() != Confirmation::None {
            render_confirm_modal(frame, area, wf.confirmation());
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, wf: &DetailWorkflow, doc: &Document) {
        let uploaded = doc
            .upload_date
            .map(|d| d.format("%b %-d, %Y %H:%M").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let name = if doc.filename.is_empty() { doc.id.as_str() } else { &doc.filename };

        let mut spans = vec![
            Span::styled(name, theme::title()),
            Span::raw("  "),
            Span::styled(format!("Uploaded: {uploaded}"), theme::muted()),
        ];
        if let Some(err) = wf.last_error() {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(format!("Delete failed: {err}"), theme::error()));
        }

        let hints = Line::from(vec![
            Span::styled("d", theme::key_hint()),
            Span::raw(":delete "),
            Span::styled("r", theme::key_hint()),
            Span::raw(":reload "),
            Span::styled("j/k", theme::key_hint()),
            Span::raw(":scroll text "),
            Span::styled("Esc", theme::key_hint()),
            Span::raw(":back"),
        ]);

        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(theme::border_default());
        frame.render_widget(
            Paragraph::new(vec![Line::from(spans), hints]).block(block),
            area,
        );
    }

    fn render_section(&self, frame: &mut Frame, area: Rect, view: &SectionView) {
        match view {
            SectionView::Text { title, body } => {
                let scroll = if *title == sections::Section::FullText.title() {
                    self.text_scroll
                } else {
                    0
                };
                frame.render_widget(
                    Paragraph::new(body.as_str())
                        .wrap(Wrap { trim: false })
                        .scroll((scroll, 0))
                        .block(theme::block_default(title)),
                    area,
                );
            }
            SectionView::Placeholder {
                title,
                message,
                reasons,
            } => {
                let mut lines = vec![Line::from(Span::styled(*message, theme::muted()))];
                lines.extend(
                    reasons
                        .iter()
                        .map(|r| Line::from(Span::styled(format!("  • {r}"), theme::key_hint()))),
                );
                frame.render_widget(
                    Paragraph::new(lines).block(theme::block_default(title)),
                    area,
                );
            }
            SectionView::Risks { title, bars, records } => {
                let block = theme::block_default(title);
                let inner = block.inner(area);
                frame.render_widget(block, area);

                let chart_height = (bars.len() as u16).min(inner.height / 2).max(1);
                let parts = Layout::vertical([
                    Constraint::Length(chart_height),
                    Constraint::Length(1),
                    Constraint::Min(0),
                ])
                .split(inner);
                frame.render_widget(RiskChart::new(bars), parts[0]);

                let lines: Vec<Line> = records
                    .iter()
                    .map(|r| {
                        Line::from(vec![
                            Span::styled(
                                format!("[{}] ", r.severity.label()),
                                Style::default().fg(theme::severity_color(r.severity)),
                            ),
                            Span::styled(r.description.as_str(), Style::default().fg(theme::TEXT)),
                        ])
                    })
                    .collect();
                frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), parts[2]);
            }
            SectionView::Entities { title, groups } => {
                let mut lines = Vec::new();
                for group in groups {
                    lines.push(Line::from(Span::styled(group.label.as_str(), theme::heading())));
                    for value in &group.shown {
                        lines.push(Line::from(Span::styled(
                            format!("  {value}"),
                            Style::default().fg(theme::PRIMARY_LIGHT),
                        )));
                    }
                    if let Some(more) = group.more_label() {
                        lines.push(Line::from(Span::styled(format!("  {more}"), theme::muted())));
                    }
                }
                frame.render_widget(
                    Paragraph::new(lines).block(theme::block_default(title)),
                    area,
                );
            }
            SectionView::Fault { title, message } => {
                let lines = vec![
                    Line::from(Span::styled(
                        "This section could not be displayed.",
                        theme::error().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(message.as_str(), theme::muted())),
                ];
                frame.render_widget(
                    Paragraph::new(lines)
                        .wrap(Wrap { trim: true })
                        .block(theme::block_fault(title)),
                    area,
                );
            }
        }
    }
}

impl Default for DetailViewState {
    fn default() -> Self {
        Self::new()
    }
}

fn render_confirm_modal(frame: &mut Frame, area: Rect, confirmation: Confirmation) {
    let modal = centered_rect(40, 20, area);
    let text = match confirmation {
        Confirmation::Deleting => Line::from(Span::styled("Deleting...", theme::muted())),
        _ => Line::from(vec![
            Span::styled(DELETE_PROMPT, Style::default().fg(theme::TEXT).add_modifier(Modifier::BOLD)),
        ]),
    };
    let block = Block::default()
        .title(" Confirm ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::ERROR));

    frame.render_widget(Clear, modal);
    frame.render_widget(
        Paragraph::new(vec![Line::raw(""), text])
            .alignment(Alignment::Center)
            .block(block),
        modal,
    );
}

fn spawn_fetch(id: DocumentId, services: &Services) {
    let api = Arc::clone(&services.api);
    let tx = services.event_tx.clone();
    tokio::spawn(async move {
        let result = api.get_document(&id).await;
        let _ = tx.send(AppEvent::DocumentLoaded { id, result });
    });
}

fn spawn_delete(id: DocumentId, services: &Services) {
    let api = Arc::clone(&services.api);
    let tx = services.event_tx.clone();
    tokio::spawn(async move {
        let result = api.delete_document(&id).await;
        let _ = tx.send(AppEvent::DocumentDeleted { id, result });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::core::api::MockDocumentApi;
    use crossterm::event::KeyModifiers;
    use tokio::sync::mpsc;

    fn loaded_view(id: &str) -> DetailViewState {
        let mut view = DetailViewState::new();
        let id = DocumentId::new(id);
        view.workflow = Some(DetailWorkflow::new(id.clone()));
        view.on_loaded(
            &id,
            Ok(Document {
                id: id.clone(),
                filename: "msa.pdf".to_string(),
                upload_date: None,
                text: None,
                analysis: None,
            }),
        );
        view
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn test_loaded_builds_all_sections() {
        let view = loaded_view("d1");
        assert_eq!(view.sections.len(), 4);
    }

    #[test]
    fn test_result_for_other_document_is_dropped() {
        let mut view = loaded_view("d1");
        let route = view.on_loaded(
            &DocumentId::new("other"),
            Err(ApiError::NotFound("other".into())),
        );
        assert!(route.is_none());
        assert!(view.workflow().and_then(|wf| wf.document()).is_some());
    }

    #[test]
    fn test_declining_prompt_sends_nothing() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let services = Services::with_api(
            Arc::new(MockDocumentApi::new()),
            &AppConfig::default(),
            tx,
        );
        let mut view = loaded_view("d1");

        assert_eq!(view.handle_input(&key('d'), &services), ViewInput::Consumed);
        assert_eq!(
            view.workflow().map(|wf| wf.confirmation()),
            Some(Confirmation::Pending)
        );
        // Global keys are swallowed while the prompt is open
        assert_eq!(view.handle_input(&key('q'), &services), ViewInput::Consumed);
        view.handle_input(&key('n'), &services);

        assert_eq!(
            view.workflow().map(|wf| wf.confirmation()),
            Some(Confirmation::None)
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_load_failure_routes_to_list() {
        let mut view = DetailViewState::new();
        let id = DocumentId::new("gone");
        view.workflow = Some(DetailWorkflow::new(id.clone()));
        let route = view.on_loaded(&id, Err(ApiError::NotFound("gone".into())));
        assert_eq!(route, Some(Route::Documents));
        assert!(view.sections.is_empty());
    }
}
