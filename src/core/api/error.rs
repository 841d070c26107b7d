//! Error types for the document analysis API client.
//!
//! Variants follow the failure taxonomy the workflows resolve:
//! local validation, transport, non-2xx responses, and well-formed
//! responses that lack required fields.

use thiserror::Error;

use super::models::ErrorBody;

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Fallback shown when an upload fails without a server message.
pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed. Check server connection.";

/// Errors that can occur talking to the analysis backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad input, detected locally or reported by the server (4xx with a message).
    #[error("Validation error: {0}")]
    Validation(String),

    /// No response reached us (connect, DNS, timeout, reset).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response.
    #[error("Server error ({status}): {body}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Raw response body, kept for diagnostics.
        body: String,
    },

    /// The requested document does not exist.
    #[error("Document not found: {0}")]
    NotFound(String),

    /// 2xx response missing required fields or not decodable.
    #[error("Malformed response: {0}")]
    Structural(String),

    /// Client misconfiguration or unreadable local input.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Creates a server error from a status code and body.
    #[must_use]
    pub fn server(status: u16, body: impl Into<String>) -> Self {
        Self::Server {
            status,
            body: body.into(),
        }
    }

    /// HTTP status associated with this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Raw response body, if the error came from a response.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Server { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Returns true if retrying the same request may succeed.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Text suitable for the UI. Raw bodies stay in the logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Network(_) => "Could not reach the server. Check your connection.".to_string(),
            Self::Server { status, body } => match ErrorBody::parse(body).and_then(|b| b.message) {
                Some(message) => message,
                None => format!("The server returned an error ({status})."),
            },
            Self::NotFound(_) => "Document not found.".to_string(),
            Self::Structural(_) => "The server sent an unexpected response.".to_string(),
            Self::Config(message) => message.clone(),
        }
    }

    /// Message shown when an upload fails: the server's own message when it
    /// sent one, otherwise a generic connection hint.
    #[must_use]
    pub fn upload_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Server { body, .. } => ErrorBody::parse(body)
                .and_then(|b| b.message)
                .unwrap_or_else(|| UPLOAD_FAILED_MESSAGE.to_string()),
            _ => UPLOAD_FAILED_MESSAGE.to_string(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Structural(err.to_string())
    }
}
