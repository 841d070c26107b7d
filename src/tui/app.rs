use std::io;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::core::api::DocumentId;
use crate::core::workflow::Route;

use super::events::{Action, AppEvent, Focus, Notification, NotificationLevel, ViewInput};
use super::layout::AppLayout;
use super::services::Services;
use super::theme;
use super::views::detail::DetailViewState;
use super::views::documents::DocumentsViewState;
use super::views::upload::UploadViewState;

const MAX_NOTIFICATIONS: usize = 3;

/// Backend reachability as last probed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendStatus {
    Unknown,
    Online,
    Offline,
}
const NOTIFICATION_TTL_TICKS: u32 = 100;

/// Central application state (Elm architecture).
pub struct AppState {
    /// Whether the app is still running.
    pub running: bool,
    /// Current location; decides which view has focus.
    pub route: Route,
    pub upload: UploadViewState,
    pub documents: DocumentsViewState,
    pub detail: DetailViewState,
    /// Active notifications (max 3 visible).
    pub notifications: Vec<Notification>,
    /// Monotonic counter for notification IDs.
    notification_counter: u64,
    /// Whether the help modal is open.
    pub show_help: bool,
    pub backend: BackendStatus,
    /// Receiver for backend events.
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    services: Services,
}

impl AppState {
    pub fn new(event_rx: mpsc::UnboundedReceiver<AppEvent>, services: Services) -> Self {
        Self {
            running: true,
            route: Route::Upload,
            upload: UploadViewState::new(&services),
            documents: DocumentsViewState::new(),
            detail: DetailViewState::new(),
            notifications: Vec::new(),
            notification_counter: 0,
            show_help: false,
            backend: BackendStatus::Unknown,
            event_rx,
            services,
        }
    }

    pub fn focus(&self) -> Focus {
        Focus::for_route(&self.route)
    }

    // ── Elm event loop ──────────────────────────────────────────────────

    /// Main event loop: render → select → update → loop.
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        tick_rate: Duration,
    ) -> io::Result<()> {
        let mut tick_interval = tokio::time::interval(tick_rate);
        let mut event_stream = EventStream::new();
        self.check_health();

        while self.running {
            terminal.draw(|frame| self.render(frame))?;

            tokio::select! {
                _ = tick_interval.tick() => {
                    self.on_tick();
                }
                Some(event) = self.event_rx.recv() => {
                    self.handle_event(event);
                }
                Some(Ok(crossterm_event)) = event_stream.next() => {
                    self.handle_event(AppEvent::Input(crossterm_event));
                }
            }
        }

        info!("event loop finished");
        Ok(())
    }

    /// Probe the backend in the background.
    fn check_health(&self) {
        let api = std::sync::Arc::clone(&self.services.api);
        let tx = self.services.event_tx.clone();
        tokio::spawn(async move {
            let result = api.health_check().await;
            let _ = tx.send(AppEvent::HealthChecked(result));
        });
    }

    // ── Event handling ──────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(crossterm_event) => {
                // Priority 1: Help modal
                if self.show_help {
                    if let Some(action) = map_help_input(&crossterm_event) {
                        self.handle_action(action);
                    }
                    return;
                }

                // Priority 2: Focused view
                match self.dispatch_view_input(&crossterm_event) {
                    ViewInput::Consumed => return,
                    ViewInput::Navigate(route) => {
                        self.navigate(route);
                        return;
                    }
                    ViewInput::Ignored => {}
                }

                // Priority 3: Global keybindings
                if let Some(action) = map_input_to_action(&crossterm_event) {
                    self.handle_action(action);
                }
            }
            AppEvent::FileRead(result) => {
                self.upload.on_file_read(result, &self.services);
            }
            AppEvent::UploadProgress(percent) => self.upload.on_progress(percent),
            AppEvent::UploadFinished(result) => {
                let failed = result.is_err();
                if let Some(route) = self.upload.on_finished(result) {
                    self.push_notification("Document uploaded".to_string(), NotificationLevel::Success);
                    self.navigate(route);
                } else if failed {
                    let message = self.upload.workflow().error().map(str::to_string);
                    if let Some(message) = message {
                        self.push_notification(message, NotificationLevel::Error);
                    }
                }
            }
            AppEvent::PageLoaded { ticket, result } => {
                self.documents.on_page_loaded(ticket, result);
            }
            AppEvent::DocumentLoaded { id, result } => {
                let viewing = self.is_viewing(&id);
                if let Some(route) = self.detail.on_loaded(&id, result) {
                    // Only redirect a user who is still looking at this document
                    if viewing {
                        self.push_notification("Document not found".to_string(), NotificationLevel::Warning);
                        self.navigate(route);
                    } else {
                        debug!(%id, route = %self.route, "late detail failure, keeping route");
                    }
                }
            }
            AppEvent::DocumentDeleted { id, result } => {
                let failed = result.is_err();
                let viewing = self.is_viewing(&id);
                if let Some(route) = self.detail.on_deleted(&id, result) {
                    self.push_notification("Document deleted".to_string(), NotificationLevel::Success);
                    if viewing {
                        self.navigate(route);
                    } else if self.route == Route::Documents {
                        self.documents.load(&self.services);
                    }
                } else if failed {
                    self.push_notification("Delete failed".to_string(), NotificationLevel::Error);
                }
            }
            AppEvent::HealthChecked(result) => match result {
                Ok(status) => {
                    info!(message = %status.message, "backend reachable");
                    self.backend = BackendStatus::Online;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "backend health check failed");
                    self.backend = BackendStatus::Offline;
                    self.push_notification(err.user_message(), NotificationLevel::Warning);
                }
            },
            AppEvent::Notification(notification) => {
                self.push_notification(notification.message, notification.level);
            }
        }
    }

    /// True while the detail view for `id` is the active route.
    fn is_viewing(&self, id: &DocumentId) -> bool {
        matches!(&self.route, Route::Document(current) if current == id)
    }

    fn dispatch_view_input(&mut self, event: &Event) -> ViewInput {
        match self.focus() {
            Focus::Upload => self.upload.handle_input(event, &self.services),
            Focus::Documents => self.documents.handle_input(event, &self.services),
            Focus::Detail => self.detail.handle_input(event, &self.services),
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::FocusUpload => self.navigate(Route::Upload),
            Action::FocusDocuments => self.navigate(Route::Documents),
            Action::TabNext => self.navigate(tab_route(self.focus().next())),
            Action::TabPrev => self.navigate(tab_route(self.focus().prev())),
            Action::ShowHelp => self.show_help = true,
            Action::CloseHelp => self.show_help = false,
        }
    }

    /// Apply a route returned by a workflow or chosen by the user, starting
    /// the target view's load.
    pub fn navigate(&mut self, route: Route) {
        debug!(from = %self.route, to = %route, "navigate");
        match &route {
            Route::Upload => {}
            Route::Documents => self.documents.load(&self.services),
            Route::Document(id) => self.detail.open(id.clone(), &self.services),
        }
        self.route = route;
    }

    // ── Notifications ───────────────────────────────────────────────────

    /// Push a notification (dedup by message, max 3).
    pub fn push_notification(&mut self, message: String, level: NotificationLevel) {
        if self.notifications.iter().any(|n| n.message == message) {
            return;
        }

        self.notification_counter += 1;
        self.notifications.push(Notification {
            id: self.notification_counter,
            message,
            level,
            ttl_ticks: NOTIFICATION_TTL_TICKS,
        });

        while self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.remove(0);
        }
    }

    /// Tick: decrement notification TTLs, dismiss expired.
    fn on_tick(&mut self) {
        for n in &mut self.notifications {
            n.ttl_ticks = n.ttl_ticks.saturating_sub(1);
        }
        self.notifications.retain(|n| n.ttl_ticks > 0);
    }

    // ── Rendering ───────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let layout = AppLayout::compute(area);

        self.render_tabs(frame, layout.tabs);
        match self.focus() {
            Focus::Upload => self.upload.render(frame, layout.main),
            Focus::Documents => self.documents.render(frame, layout.main),
            Focus::Detail => self.detail.render(frame, layout.main),
        }
        self.render_status_bar(frame, layout.status);

        // Overlays
        self.render_notifications(frame, area);
        if self.show_help {
            self.render_help_modal(frame, area);
        }
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let focus = self.focus();
        let mut spans = Vec::new();
        for (i, tab) in Focus::TABS.iter().enumerate() {
            let style = if *tab == focus {
                theme::highlight()
            } else {
                theme::muted()
            };
            spans.push(Span::styled(format!(" {} {} ", i + 1, tab.label()), style));
        }
        if focus == Focus::Detail {
            spans.push(Span::styled(" › ", theme::key_hint()));
            spans.push(Span::styled(self.route.path(), theme::highlight()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let mode_indicator = if self.focus() == Focus::Upload && self.upload.is_editing() {
            Span::styled(" EDIT ", theme::insert_badge())
        } else {
            Span::raw("")
        };

        let activity = if self.upload.workflow().is_uploading() {
            Span::styled(
                format!("uploading {}%", self.upload.workflow().progress()),
                Style::default().fg(theme::PRIMARY_LIGHT),
            )
        } else if self.documents.workflow().is_loading() && self.focus() == Focus::Documents {
            Span::styled("loading", Style::default().fg(theme::PRIMARY_LIGHT))
        } else {
            Span::styled("ready", theme::muted())
        };

        let backend = match self.backend {
            BackendStatus::Unknown => Span::styled("●", theme::muted()),
            BackendStatus::Online => Span::styled("●", Style::default().fg(theme::SUCCESS)),
            BackendStatus::Offline => Span::styled("●", Style::default().fg(theme::ERROR)),
        };

        let status = Line::from(vec![
            Span::styled(" legalmate ", theme::brand_badge()),
            Span::raw(" "),
            backend,
            Span::raw(" "),
            mode_indicator,
            Span::raw(" "),
            Span::styled(
                self.focus().label(),
                Style::default()
                    .fg(theme::PRIMARY_LIGHT)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" │ "),
            activity,
            Span::raw(" │ "),
            Span::styled("1/2", theme::key_hint()),
            Span::raw(":view "),
            Span::styled("?", theme::key_hint()),
            Span::raw(":help "),
            Span::styled("q", theme::key_hint()),
            Span::raw(":quit"),
        ]);

        frame.render_widget(Paragraph::new(status), area);
    }

    fn render_notifications(&self, frame: &mut Frame, area: Rect) {
        if self.notifications.is_empty() {
            return;
        }

        let max_width = 50.min(area.width.saturating_sub(2));
        let height = self.notifications.len() as u16;
        let x = area.width.saturating_sub(max_width + 1);
        let notification_area = Rect::new(x, 1, max_width, height.min(area.height));

        let lines: Vec<Line> = self
            .notifications
            .iter()
            .map(|n| {
                let (prefix, color) = match n.level {
                    NotificationLevel::Info => ("ℹ", theme::INFO),
                    NotificationLevel::Success => ("✓", theme::SUCCESS),
                    NotificationLevel::Warning => ("⚠", theme::WARNING),
                    NotificationLevel::Error => ("✗", theme::ERROR),
                };
                Line::from(vec![
                    Span::styled(format!(" {prefix} "), Style::default().fg(color).add_modifier(Modifier::BOLD)),
                    Span::raw(n.message.as_str()),
                ])
            })
            .collect();

        frame.render_widget(Clear, notification_area);
        frame.render_widget(Paragraph::new(lines), notification_area);
    }

    fn render_help_modal(&self, frame: &mut Frame, area: Rect) {
        let modal = centered_rect(60, 70, area);

        let keybindings = [
            ("Global:", ""),
            ("1 / 2", "Upload / Documents"),
            ("Tab / Shift+Tab", "Next / previous view"),
            ("?", "Toggle this help"),
            ("q / Ctrl+C", "Quit"),
            ("", ""),
            ("Upload:", ""),
            ("i / Enter", "Edit the file path"),
            ("Enter (editing)", "Upload the file"),
            ("Esc", "Stop editing"),
            ("", ""),
            ("Documents:", ""),
            ("j/k", "Select document"),
            ("n/p, ←/→", "Next / previous page"),
            ("Enter", "Open document"),
            ("r", "Refresh"),
            ("", ""),
            ("Document:", ""),
            ("d", "Delete (asks y/n)"),
            ("r", "Reload"),
            ("j/k", "Scroll full text"),
            ("Esc", "Back to list"),
        ];

        let mut lines = vec![
            Line::raw(""),
            Line::from(Span::styled(" Keybindings", theme::title())),
            Line::raw(""),
        ];

        for (key, desc) in &keybindings {
            if key.is_empty() {
                lines.push(Line::raw(""));
            } else if desc.is_empty() {
                lines.push(Line::from(Span::styled(format!("  {key}"), theme::title())));
            } else {
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(
                        format!("{key:<18}"),
                        Style::default().fg(theme::PRIMARY_LIGHT).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(*desc),
                ]));
            }
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::raw("  Press "),
            Span::styled("?", Style::default().fg(theme::PRIMARY_LIGHT).add_modifier(Modifier::BOLD)),
            Span::raw(" or "),
            Span::styled("Esc", Style::default().fg(theme::PRIMARY_LIGHT).add_modifier(Modifier::BOLD)),
            Span::raw(" to close"),
        ]));

        let block = Block::default()
            .title(" Help ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT));

        frame.render_widget(Clear, modal);
        frame.render_widget(Paragraph::new(lines).block(block), modal);
    }
}

fn tab_route(focus: Focus) -> Route {
    match focus {
        Focus::Documents => Route::Documents,
        Focus::Upload | Focus::Detail => Route::Upload,
    }
}

// ── Input mapping ───────────────────────────────────────────────────────────

fn map_help_input(event: &Event) -> Option<Action> {
    let Event::Key(KeyEvent {
        code,
        kind: KeyEventKind::Press,
        ..
    }) = event
    else {
        return None;
    };
    match code {
        KeyCode::Esc | KeyCode::Char('?') => Some(Action::CloseHelp),
        _ => None,
    }
}

fn map_input_to_action(event: &Event) -> Option<Action> {
    let Event::Key(KeyEvent {
        code,
        modifiers,
        kind: KeyEventKind::Press,
        ..
    }) = event
    else {
        return None;
    };

    match (*modifiers, *code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(Action::Quit),
        (KeyModifiers::NONE | KeyModifiers::SHIFT, code) => match code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('?') => Some(Action::ShowHelp),
            KeyCode::Tab => Some(Action::TabNext),
            KeyCode::BackTab => Some(Action::TabPrev),
            KeyCode::Char('1') => Some(Action::FocusUpload),
            KeyCode::Char('2') => Some(Action::FocusDocuments),
            _ => None,
        },
        _ => None,
    }
}

/// Calculate a centered rect using percentage of parent area.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::AppConfig;
    use crate::core::api::{ApiError, DeleteConfirmation, Document, DocumentPage, MockDocumentApi};

    fn app_with(api: MockDocumentApi) -> AppState {
        let (tx, rx) = mpsc::unbounded_channel();
        let services = Services::with_api(Arc::new(api), &AppConfig::default(), tx);
        AppState::new(rx, services)
    }

    fn app() -> AppState {
        app_with(MockDocumentApi::new())
    }

    /// Mock that answers the background fetches started by `navigate`.
    fn quiet_api() -> MockDocumentApi {
        let mut api = MockDocumentApi::new();
        api.expect_get_document()
            .returning(|id| Err(ApiError::NotFound(id.to_string())));
        api.expect_list_documents().returning(|_| {
            Ok(DocumentPage {
                documents: Vec::new(),
                total: 0,
            })
        });
        api
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> AppEvent {
        AppEvent::Input(Event::Key(KeyEvent::new(code, modifiers)))
    }

    #[test]
    fn test_starts_on_upload() {
        let app = app();
        assert_eq!(app.route, Route::Upload);
        assert_eq!(app.focus(), Focus::Upload);
    }

    #[test]
    fn test_global_keys_map_to_actions() {
        let ev = |c| Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        assert_eq!(map_input_to_action(&ev('q')), Some(Action::Quit));
        assert_eq!(map_input_to_action(&ev('2')), Some(Action::FocusDocuments));
        assert_eq!(map_input_to_action(&ev('x')), None);
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(map_input_to_action(&ctrl_c), Some(Action::Quit));
    }

    #[test]
    fn test_ctrl_c_quits_while_editing_path() {
        let mut app = app();
        assert!(app.upload.is_editing());
        app.handle_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!app.running);
    }

    #[test]
    fn test_help_modal_swallows_input() {
        let mut app = app();
        app.handle_event(key(KeyCode::Esc, KeyModifiers::NONE)); // leave path field
        app.handle_event(key(KeyCode::Char('?'), KeyModifiers::NONE));
        assert!(app.show_help);
        app.handle_event(key(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(app.running);
        app.handle_event(key(KeyCode::Esc, KeyModifiers::NONE));
        assert!(!app.show_help);
    }

    #[tokio::test]
    async fn test_detail_failure_navigates_to_documents() {
        let mut app = app_with(quiet_api());
        let id = DocumentId::new("d1");
        app.navigate(Route::Document(id.clone()));
        app.handle_event(AppEvent::DocumentLoaded {
            id,
            result: Err(ApiError::Structural("document response missing `id`".into())),
        });
        assert_eq!(app.route, Route::Documents);
        assert!(app.notifications.iter().any(|n| n.level == NotificationLevel::Warning));
    }

    #[tokio::test]
    async fn test_late_detail_failure_keeps_current_route() {
        let mut app = app_with(quiet_api());
        let id = DocumentId::new("d1");
        app.navigate(Route::Document(id.clone()));
        app.navigate(Route::Upload);
        app.handle_event(AppEvent::DocumentLoaded {
            id,
            result: Err(ApiError::server(503, "")),
        });
        assert_eq!(app.route, Route::Upload);
        assert!(app.notifications.is_empty());
    }

    #[tokio::test]
    async fn test_late_delete_success_does_not_redirect() {
        let mut app = app_with(quiet_api());
        let id = DocumentId::new("d1");
        app.navigate(Route::Document(id.clone()));
        app.handle_event(AppEvent::DocumentLoaded {
            id: id.clone(),
            result: Ok(Document {
                id: id.clone(),
                filename: "lease.pdf".into(),
                upload_date: None,
                text: None,
                analysis: None,
            }),
        });
        app.navigate(Route::Upload);
        app.handle_event(AppEvent::DocumentDeleted {
            id: id.clone(),
            result: Ok(DeleteConfirmation { id }),
        });
        assert_eq!(app.route, Route::Upload);
        assert!(app.notifications.iter().any(|n| n.level == NotificationLevel::Success));
    }

    #[tokio::test]
    async fn test_loaded_document_stays_on_detail() {
        let mut app = app_with(quiet_api());
        let id = DocumentId::new("d1");
        app.navigate(Route::Document(id.clone()));
        app.handle_event(AppEvent::DocumentLoaded {
            id: id.clone(),
            result: Ok(Document {
                id: id.clone(),
                filename: "lease.pdf".into(),
                upload_date: None,
                text: Some("Lease".into()),
                analysis: None,
            }),
        });
        assert_eq!(app.route, Route::Document(id));
    }

    #[test]
    fn test_health_result_sets_backend_status() {
        let mut app = app();
        assert_eq!(app.backend, BackendStatus::Unknown);
        app.handle_event(AppEvent::HealthChecked(Ok(crate::core::api::HealthStatus {
            message: "LegalMate API is running".into(),
        })));
        assert_eq!(app.backend, BackendStatus::Online);

        app.handle_event(AppEvent::HealthChecked(Err(ApiError::server(502, ""))));
        assert_eq!(app.backend, BackendStatus::Offline);
        assert_eq!(app.notifications.len(), 1);
    }

    #[test]
    fn test_notifications_dedup_and_cap() {
        let mut app = app();
        for i in 0..5 {
            app.push_notification(format!("n{i}"), NotificationLevel::Info);
        }
        app.push_notification("n4".to_string(), NotificationLevel::Info);
        assert_eq!(app.notifications.len(), MAX_NOTIFICATIONS);
        assert_eq!(app.notifications[0].message, "n2");
    }

    #[test]
    fn test_notifications_expire() {
        let mut app = app();
        app.push_notification("bye".to_string(), NotificationLevel::Info);
        for _ in 0..NOTIFICATION_TTL_TICKS {
            app.on_tick();
        }
        assert!(app.notifications.is_empty());
    }

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 50);
        let centered = centered_rect(50, 50, area);
        assert!(centered.x > 0);
        assert!(centered.y > 0);
        assert!(centered.x + centered.width <= area.width);
        assert!(centered.y + centered.height <= area.height);
    }
}
