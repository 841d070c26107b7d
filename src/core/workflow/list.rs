//! Document list workflow: `Loading → Loaded | Failed`, re-entered on every
//! page change.
//!
//! Each request is tagged with a [`PageTicket`]. Only the most recently
//! issued ticket may update state, so a slow response for an abandoned page
//! can never overwrite a newer one.

use tracing::{debug, warn};

use crate::core::api::{ApiError, DocumentApi, DocumentPage, DocumentSummary};

/// Tag identifying one issued page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTicket {
    pub seq: u64,
    pub page: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListState {
    Loading {
        page: u64,
    },
    Loaded {
        documents: Vec<DocumentSummary>,
        page: u64,
        total_pages: u64,
    },
    Failed {
        page: u64,
        message: String,
    },
}

pub struct ListWorkflow {
    state: ListState,
    /// Sequence number of the latest issued request.
    latest_seq: u64,
    /// Page count from the last successful load, used for clamping.
    known_total_pages: u64,
}

impl ListWorkflow {
    pub fn new() -> Self {
        Self {
            state: ListState::Loading { page: 1 },
            latest_seq: 0,
            known_total_pages: 1,
        }
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ListState::Loading { .. })
    }

    /// Page currently shown or being loaded.
    pub fn page(&self) -> u64 {
        match self.state {
            ListState::Loading { page }
            | ListState::Loaded { page, .. }
            | ListState::Failed { page, .. } => page,
        }
    }

    pub fn total_pages(&self) -> u64 {
        self.known_total_pages
    }

    pub fn documents(&self) -> &[DocumentSummary] {
        match &self.state {
            ListState::Loaded { documents, .. } => documents,
            _ => &[],
        }
    }

    /// Enter `Loading` for `page` and issue a ticket for the request.
    /// Pages below 1 are clamped to 1.
    pub fn request(&mut self, page: u64) -> PageTicket {
        let page = page.max(1);
        self.latest_seq += 1;
        self.state = ListState::Loading { page };
        debug!(seq = self.latest_seq, page, "page requested");
        PageTicket {
            seq: self.latest_seq,
            page,
        }
    }

    /// Re-request the current page.
    pub fn reload(&mut self) -> PageTicket {
        self.request(self.page())
    }

    /// Request the next page, or `None` when already on the last one.
    pub fn next_page(&mut self) -> Option<PageTicket> {
        let page = self.page();
        (page < self.known_total_pages).then(|| self.request(page + 1))
    }

    /// Request the previous page, or `None` when already on the first one.
    pub fn prev_page(&mut self) -> Option<PageTicket> {
        let page = self.page();
        (page > 1).then(|| self.request(page - 1))
    }

    /// Apply a response. Returns false (and changes nothing) if `ticket` is
    /// not the latest issued request.
    pub fn apply(&mut self, ticket: PageTicket, result: Result<DocumentPage, ApiError>) -> bool {
        if ticket.seq != self.latest_seq {
            debug!(
                seq = ticket.seq,
                latest = self.latest_seq,
                page = ticket.page,
                "discarding stale page response"
            );
            return false;
        }
        match result {
            Ok(page) => {
                let total_pages = page.total_pages();
                self.known_total_pages = total_pages.max(1);
                self.state = ListState::Loaded {
                    documents: page.documents,
                    page: ticket.page,
                    total_pages,
                };
            }
            Err(err) => {
                warn!(
                    page = ticket.page,
                    error = %err,
                    status = ?err.status(),
                    body = err.body().unwrap_or_default(),
                    "failed to load documents"
                );
                self.state = ListState::Failed {
                    page: ticket.page,
                    message: err.user_message(),
                };
            }
        }
        true
    }

    /// Request `page` and apply the response.
    ///
    /// Holds the workflow for the whole round trip, so a second page change
    /// cannot overtake this one. Callers that issue overlapping requests use
    /// [`request`](Self::request) and later [`apply`](Self::apply) each
    /// response with its ticket.
    pub async fn load(&mut self, api: &dyn DocumentApi, page: u64) -> bool {
        let ticket = self.request(page);
        let result = api.list_documents(ticket.page).await;
        self.apply(ticket, result)
    }
}

impl Default for ListWorkflow {
    fn default() -> Self {
        Self::new()
    }
}
