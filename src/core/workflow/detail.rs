//! Detail workflow: `Loading → Loaded(document) | NotFound`.
//!
//! Any load failure (missing `id`, 404, server or network error) lands in
//! `NotFound` and hands back a route to the list. Deleting requires an
//! explicit yes/no answer; a failed delete keeps the view and records the
//! error.

use tracing::{info, warn};

use super::navigation::Route;
use crate::core::api::{ApiError, DeleteConfirmation, Document, DocumentApi, DocumentId};

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Loading,
    Loaded(Document),
    NotFound,
}

/// Delete confirmation prompt state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    None,
    Pending,
    Deleting,
}

pub struct DetailWorkflow {
    id: DocumentId,
    state: DetailState,
    confirmation: Confirmation,
    last_error: Option<String>,
}

impl DetailWorkflow {
    /// Start in `Loading` for `id`.
    pub fn new(id: DocumentId) -> Self {
        Self {
            id,
            state: DetailState::Loading,
            confirmation: Confirmation::None,
            last_error: None,
        }
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn document(&self) -> Option<&Document> {
        match &self.state {
            DetailState::Loaded(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn confirmation(&self) -> Confirmation {
        self.confirmation
    }

    /// Last delete failure, for display.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Re-enter `Loading` (reload).
    pub fn restart(&mut self) {
        self.state = DetailState::Loading;
        self.confirmation = Confirmation::None;
    }

    /// Apply the fetch result. Returns `Route::Documents` on any failure.
    pub fn on_loaded(&mut self, result: Result<Document, ApiError>) -> Option<Route> {
        match result {
            Ok(doc) if doc.id == self.id => {
                self.state = DetailState::Loaded(doc);
                None
            }
            Ok(doc) => {
                warn!(requested = %self.id, received = %doc.id, "document id mismatch");
                self.state = DetailState::NotFound;
                Some(Route::Documents)
            }
            Err(err) => {
                warn!(
                    id = %self.id,
                    error = %err,
                    status = ?err.status(),
                    body = err.body().unwrap_or_default(),
                    "document load failed"
                );
                self.state = DetailState::NotFound;
                Some(Route::Documents)
            }
        }
    }

    /// Fetch the document and apply the result.
    pub async fn load(&mut self, api: &dyn DocumentApi) -> Option<Route> {
        self.restart();
        let result = api.get_document(&self.id).await;
        self.on_loaded(result)
    }

    /// Ask for delete confirmation. Only possible once loaded.
    pub fn request_delete(&mut self) -> bool {
        if self.document().is_none() || self.confirmation != Confirmation::None {
            return false;
        }
        self.confirmation = Confirmation::Pending;
        true
    }

    /// Answer the prompt. Returns the id to delete when confirmed; declining
    /// closes the prompt without any request.
    pub fn answer(&mut self, confirmed: bool) -> Option<DocumentId> {
        if self.confirmation != Confirmation::Pending {
            return None;
        }
        if confirmed {
            self.confirmation = Confirmation::Deleting;
            self.last_error = None;
            Some(self.id.clone())
        } else {
            self.confirmation = Confirmation::None;
            None
        }
    }

    /// Apply the delete outcome. Success routes to the list; failure keeps
    /// the current view and records the error.
    pub fn on_deleted(&mut self, result: Result<DeleteConfirmation, ApiError>) -> Option<Route> {
        self.confirmation = Confirmation::None;
        match result {
            Ok(confirmation) => {
                info!(id = %confirmation.id, "document deleted");
                Some(Route::Documents)
            }
            Err(err) => {
                warn!(
                    id = %self.id,
                    status = ?err.status(),
                    body = err.body().unwrap_or_default(),
                    error = %err,
                    "delete failed"
                );
                self.last_error = Some(err.user_message());
                None
            }
        }
    }

    /// Full delete interaction: prompt via `confirm`, then call the API only
    /// if the user agreed.
    pub async fn delete_with_confirmation<F>(
        &mut self,
        api: &dyn DocumentApi,
        confirm: F,
    ) -> Option<Route>
    where
        F: FnOnce(&Document) -> bool,
    {
        if !self.request_delete() {
            return None;
        }
        let agreed = self.document().map(confirm).unwrap_or(false);
        let id = self.answer(agreed)?;
        let result = api.delete_document(&id).await;
        self.on_deleted(result)
    }
}
