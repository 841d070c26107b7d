use crate::core::api::{
    ApiError, DeleteConfirmation, Document, DocumentId, DocumentPage, HealthStatus, UploadFile,
    UploadReceipt,
};
use crate::core::workflow::{PageTicket, Route};

/// Events flowing through the Elm-architecture event loop.
///
/// Not `Clone`: API results carry [`ApiError`], which owns a
/// `reqwest::Error`.
#[derive(Debug)]
pub enum AppEvent {
    /// Raw terminal input (keyboard/mouse).
    Input(crossterm::event::Event),
    /// A local file finished reading (or failed to).
    FileRead(Result<UploadFile, String>),
    /// Upload progress percentage.
    UploadProgress(u8),
    UploadFinished(Result<UploadReceipt, ApiError>),
    PageLoaded {
        ticket: PageTicket,
        result: Result<DocumentPage, ApiError>,
    },
    DocumentLoaded {
        id: DocumentId,
        result: Result<Document, ApiError>,
    },
    DocumentDeleted {
        id: DocumentId,
        result: Result<DeleteConfirmation, ApiError>,
    },
    /// Result of the startup `GET /` probe.
    HealthChecked(Result<HealthStatus, ApiError>),
    /// Notification to display to the user.
    Notification(Notification),
}

/// High-level actions dispatched by the input mapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    FocusUpload,
    FocusDocuments,
    TabNext,
    TabPrev,
    ShowHelp,
    CloseHelp,
    Quit,
}

/// Outcome of routing input to a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewInput {
    /// Not handled; fall through to global keybindings.
    Ignored,
    Consumed,
    Navigate(Route),
}

/// Which top-level view has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Focus {
    Upload,
    Documents,
    Detail,
}

impl Focus {
    /// Views reachable from the tab bar.
    pub const TABS: [Focus; 2] = [Focus::Upload, Focus::Documents];

    pub fn for_route(route: &Route) -> Focus {
        match route {
            Route::Upload => Focus::Upload,
            Route::Documents => Focus::Documents,
            Route::Document(_) => Focus::Detail,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Focus::Upload => "Upload",
            Focus::Documents => "Documents",
            Focus::Detail => "Document",
        }
    }

    pub fn next(self) -> Focus {
        let idx = Focus::TABS.iter().position(|&f| f == self).unwrap_or(0);
        Focus::TABS[(idx + 1) % Focus::TABS.len()]
    }

    pub fn prev(self) -> Focus {
        let idx = Focus::TABS.iter().position(|&f| f == self).unwrap_or(0);
        Focus::TABS[(idx + Focus::TABS.len() - 1) % Focus::TABS.len()]
    }
}

/// Notification level for the overlay system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A timed notification shown in the overlay.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub level: NotificationLevel,
    /// Ticks remaining before auto-dismiss.
    pub ttl_ticks: u32,
}
