//! Document analysis API client.

pub mod client;
pub mod error;
pub mod models;
pub mod progress;

pub use client::{DocumentApi, HttpDocumentClient};
pub use error::{ApiError, Result, UPLOAD_FAILED_MESSAGE};
pub use models::{
    total_pages, Analysis, DeleteConfirmation, Document, DocumentId, DocumentPage,
    DocumentSummary, HealthStatus, RiskRecord, Severity, UploadFile, UploadReceipt, PAGE_SIZE,
};
pub use progress::{no_progress, ProgressFn};

#[cfg(test)]
pub use client::MockDocumentApi;
