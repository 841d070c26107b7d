//! Upload view: type a local path, press Enter, watch the progress gauge.

use std::path::PathBuf;
use std::sync::Arc;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{LineGauge, Paragraph, Wrap},
    Frame,
};

use crate::core::api::{ApiError, ProgressFn, UploadFile, UploadReceipt};
use crate::core::workflow::{Route, UploadState, UploadWorkflow};

use super::super::events::{AppEvent, NotificationLevel, ViewInput};
use super::super::services::Services;
use super::super::theme;
use super::super::widgets::input_buffer::InputBuffer;

pub struct UploadViewState {
    workflow: UploadWorkflow,
    input: InputBuffer,
    /// Path field has keyboard focus.
    editing: bool,
    /// A file read is in flight.
    reading: bool,
}

impl UploadViewState {
    pub fn new(services: &Services) -> Self {
        Self {
            workflow: UploadWorkflow::new(services.upload_policy.clone()),
            input: InputBuffer::new(),
            editing: true,
            reading: false,
        }
    }

    pub fn workflow(&self) -> &UploadWorkflow {
        &self.workflow
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn handle_input(&mut self, event: &Event, services: &Services) -> ViewInput {
        if let Event::Paste(text) = event {
            if self.editing {
                self.input.insert_str(text);
                return ViewInput::Consumed;
            }
            return ViewInput::Ignored;
        }

        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return ViewInput::Ignored;
        };

        if !self.editing {
            return match code {
                KeyCode::Char('i') | KeyCode::Char('e') | KeyCode::Enter => {
                    self.editing = true;
                    ViewInput::Consumed
                }
                _ => ViewInput::Ignored,
            };
        }

        if modifiers.contains(KeyModifiers::CONTROL) {
            return ViewInput::Ignored;
        }

        match code {
            KeyCode::Esc => self.editing = false,
            KeyCode::Enter => self.submit(services),
            KeyCode::Char(c) => self.input.insert_char(*c),
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Delete => self.input.delete(),
            KeyCode::Left => self.input.move_left(),
            KeyCode::Right => self.input.move_right(),
            KeyCode::Home => self.input.move_home(),
            KeyCode::End => self.input.move_end(),
            _ => return ViewInput::Ignored,
        }
        ViewInput::Consumed
    }

    /// Read the typed path in the background; the result comes back as
    /// [`AppEvent::FileRead`].
    fn submit(&mut self, services: &Services) {
        if self.input.is_empty() || self.reading || self.workflow.is_uploading() {
            return;
        }
        self.reading = true;
        let path = expand_home(self.input.text().trim());
        let tx = services.event_tx.clone();

        tokio::spawn(async move {
            let result = UploadFile::from_path(&path)
                .await
                .map_err(|e| format!("Could not read {}: {e}", path.display()));
            let _ = tx.send(AppEvent::FileRead(result));
        });
    }

    /// Hand a read file to the workflow and start the upload if it passes
    /// pre-flight.
    pub fn on_file_read(&mut self, result: Result<UploadFile, String>, services: &Services) {
        self.reading = false;
        let file = match result {
            Ok(file) => file,
            Err(message) => {
                tracing::warn!(%message, "file read failed");
                services.notify(message.clone(), NotificationLevel::Error);
                self.workflow.reject(message);
                return;
            }
        };
        if !self.workflow.begin(&file) {
            return;
        }
        self.editing = false;

        let api = Arc::clone(&services.api);
        let tx = services.event_tx.clone();
        let progress_tx = tx.clone();
        let on_progress: ProgressFn = Arc::new(move |percent| {
            let _ = progress_tx.send(AppEvent::UploadProgress(percent));
        });

        tokio::spawn(async move {
            let result = api.upload_document(file, on_progress).await;
            let _ = tx.send(AppEvent::UploadFinished(result));
        });
    }

    pub fn on_progress(&mut self, percent: u8) {
        self.workflow.on_progress(percent);
    }

    pub fn on_finished(&mut self, result: Result<UploadReceipt, ApiError>) -> Option<Route> {
        let route = self.workflow.finish(result);
        if route.is_some() {
            self.input.clear();
        } else {
            self.editing = true;
        }
        route
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = theme::block_focused("Upload Legal Document");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::vertical([
            Constraint::Length(2), // Intro
            Constraint::Length(3), // Path field
            Constraint::Length(2), // Gauge
            Constraint::Min(1),    // Status / hints
        ])
        .margin(1)
        .split(inner);

        let allowed = self
            .workflow
            .policy()
            .allowed_extensions
            .iter()
            .map(|e| format!(".{e}"))
            .collect::<Vec<_>>()
            .join(", ");
        frame.render_widget(
            Paragraph::new(vec![
                Line::from(Span::styled(
                    "Enter the path of a contract to analyse.",
                    Style::default().fg(theme::TEXT),
                )),
                Line::from(Span::styled(format!("Supported: {allowed}"), theme::muted())),
            ]),
            rows[0],
        );

        let field_block = if self.editing {
            theme::block_focused("File path")
        } else {
            theme::block_default("File path")
        };
        frame.render_widget(
            Paragraph::new(self.input.to_line("e.g. ~/contracts/nda.pdf", self.editing))
                .block(field_block),
            rows[1],
        );

        if let UploadState::Uploading { .. } | UploadState::Done { .. } = self.workflow.state() {
            let progress = self.workflow.progress();
            let gauge = LineGauge::default()
                .ratio(f64::from(progress) / 100.0)
                .label(format!("{progress}%"))
                .filled_style(Style::default().fg(theme::PRIMARY))
                .unfilled_style(Style::default().fg(theme::TEXT_DIM));
            frame.render_widget(gauge, rows[2]);
        }

        frame.render_widget(
            Paragraph::new(self.status_lines()).wrap(Wrap { trim: true }),
            rows[3],
        );
    }

    fn status_lines(&self) -> Vec<Line<'_>> {
        let mut lines = Vec::new();
        if self.reading {
            lines.push(Line::from(Span::styled("Reading file...", theme::muted())));
        }
        match self.workflow.state() {
            UploadState::Idle => {}
            UploadState::Uploading { file_name, .. } => {
                lines.push(Line::from(vec![
                    Span::styled("Uploading ", theme::muted()),
                    Span::styled(file_name.as_str(), theme::heading()),
                ]));
            }
            UploadState::Done { id } => {
                lines.push(Line::from(Span::styled(
                    format!("Uploaded as {id}"),
                    Style::default().fg(theme::SUCCESS),
                )));
            }
            UploadState::Failed { message } => {
                lines.push(Line::from(Span::styled(
                    message.as_str(),
                    theme::error().add_modifier(Modifier::BOLD),
                )));
            }
        }
        lines.push(Line::raw(""));
        let hint = if self.editing {
            "Enter:upload  Esc:stop editing"
        } else {
            "i:edit path  1/2:switch view  ?:help"
        };
        lines.push(Line::from(Span::styled(hint, theme::key_hint())));
        lines
    }
}

/// Expand a leading `~` to the home directory.
fn expand_home(raw: &str) -> PathBuf {
    match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(raw),
        },
        _ => PathBuf::from(raw),
    }
}
