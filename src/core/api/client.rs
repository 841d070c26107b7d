//! HTTP client for the document analysis backend.
//!
//! [`DocumentApi`] is the seam the workflows depend on;
//! [`HttpDocumentClient`] implements it with reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use super::error::{ApiError, Result};
use super::models::{
    DeleteConfirmation, Document, DocumentId, DocumentPage, ErrorBody, HealthStatus,
    ListResponse, UploadFile, UploadReceipt,
};
use super::progress::{tracked_body, ProgressFn, ProgressTracker};
use crate::config::{ApiConfig, UploadConfig};

/// Operations the client workflows need from the backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// `GET /documents?page=n` (1-based).
    async fn list_documents(&self, page: u64) -> Result<DocumentPage>;

    /// `GET /documents/{id}`.
    async fn get_document(&self, id: &DocumentId) -> Result<Document>;

    /// `DELETE /documents/{id}`.
    async fn delete_document(&self, id: &DocumentId) -> Result<DeleteConfirmation>;

    /// `POST /documents/` as multipart field `file`, reporting 0..=100
    /// progress while the body is sent.
    async fn upload_document(&self, file: UploadFile, on_progress: ProgressFn)
        -> Result<UploadReceipt>;

    /// `GET /` liveness message.
    async fn health_check(&self) -> Result<HealthStatus>;
}

/// reqwest-backed [`DocumentApi`].
#[derive(Clone)]
pub struct HttpDocumentClient {
    http: Client,
    base: Url,
    chunk_size: usize,
}

impl HttpDocumentClient {
    /// Build a client from configuration.
    ///
    /// Fails with [`ApiError::Config`] when the base URL is not an absolute
    /// http(s) URL.
    pub fn new(api: &ApiConfig, upload: &UploadConfig) -> Result<Self> {
        let base = parse_base_url(&api.base_url)?;
        let http = Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .connect_timeout(Duration::from_secs(api.connect_timeout_secs))
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base,
            chunk_size: upload.chunk_size.max(1),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    /// An empty trailing segment yields a trailing slash.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::Config(format!("base URL cannot have paths: {}", self.base)))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    fn documents_url(&self) -> Result<Url> {
        self.endpoint(&["documents"])
    }

    fn document_url(&self, id: &DocumentId) -> Result<Url> {
        self.endpoint(&["documents", id.as_str()])
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ApiError::Config(format!("invalid API base URL {raw:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" if !url.cannot_be_a_base() => Ok(url),
        _ => Err(ApiError::Config(format!(
            "API base URL must be http(s): {raw:?}"
        ))),
    }
}

/// Consume a non-2xx response into a [`ApiError::Server`], logging it.
async fn server_error(response: Response, operation: &str) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    warn!(operation, status, body = %body, "API request failed");
    ApiError::server(status, body)
}

/// Read a 2xx body as JSON, mapping decode problems to structural errors.
async fn json_body(response: Response) -> Result<Value> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Err(ApiError::Structural("empty response body".to_string()));
    }
    Ok(serde_json::from_str(&text)?)
}

#[async_trait]
impl DocumentApi for HttpDocumentClient {
    #[instrument(skip(self))]
    async fn list_documents(&self, page: u64) -> Result<DocumentPage> {
        if page == 0 {
            return Err(ApiError::Validation("page numbers start at 1".to_string()));
        }
        let url = self.documents_url()?;
        debug!(%url, page, "GET documents");

        let response = self
            .http
            .get(url)
            .query(&[("page", page)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(server_error(response, "list_documents").await);
        }

        let wire: ListResponse = serde_json::from_value(json_body(response).await?)?;
        let documents = wire
            .data
            .ok_or_else(|| ApiError::Structural("list response missing `data`".to_string()))?;
        let total = wire
            .pagination
            .and_then(|p| p.total)
            .ok_or_else(|| {
                ApiError::Structural("list response missing `pagination.total`".to_string())
            })?;

        Ok(DocumentPage { documents, total })
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_document(&self, id: &DocumentId) -> Result<Document> {
        let url = self.document_url(id)?;
        debug!(%url, "GET document");

        let response = self.http.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(id.to_string()));
        }
        if !response.status().is_success() {
            return Err(server_error(response, "get_document").await);
        }

        let value = json_body(response).await?;
        if value.get("id").and_then(DocumentId::from_value).is_none() {
            return Err(ApiError::Structural(
                "document response missing `id`".to_string(),
            ));
        }
        Ok(serde_json::from_value(value)?)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete_document(&self, id: &DocumentId) -> Result<DeleteConfirmation> {
        let url = self.document_url(id)?;
        debug!(%url, "DELETE document");

        let response = self.http.delete(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(id.to_string()));
        }
        if !response.status().is_success() {
            return Err(server_error(response, "delete_document").await);
        }

        Ok(DeleteConfirmation { id: id.clone() })
    }

    #[instrument(skip(self, file, on_progress), fields(file = %file.file_name, size = file.len()))]
    async fn upload_document(
        &self,
        file: UploadFile,
        on_progress: ProgressFn,
    ) -> Result<UploadReceipt> {
        let url = self.endpoint(&["documents", ""])?;
        debug!(%url, "POST document");

        let mime = file.mime_type();
        let tracker = ProgressTracker::new(file.len(), on_progress);
        let body = tracked_body(file.bytes, self.chunk_size, tracker.clone());
        let part = multipart::Part::stream_with_length(body, tracker.total())
            .file_name(file.file_name)
            .mime_str(mime)
            .map_err(|e| ApiError::Config(format!("invalid MIME type {mime}: {e}")))?;
        let form = multipart::Form::new().part("file", part);

        let response = self.http.post(url).multipart(form).send().await?;
        let status = response.status();

        if status.is_success() {
            let value = json_body(response).await?;
            let id = value
                .get("id")
                .and_then(DocumentId::from_value)
                .ok_or_else(|| ApiError::Structural("upload response missing `id`".to_string()))?;
            tracker.complete();
            return Ok(UploadReceipt {
                id,
                filename: value.get("filename").and_then(Value::as_str).map(str::to_string),
                status: value.get("status").and_then(Value::as_str).map(str::to_string),
            });
        }

        match status {
            StatusCode::BAD_REQUEST
            | StatusCode::PAYLOAD_TOO_LARGE
            | StatusCode::UNSUPPORTED_MEDIA_TYPE
            | StatusCode::UNPROCESSABLE_ENTITY => {
                let body = response.text().await.unwrap_or_default();
                warn!(status = status.as_u16(), body = %body, "upload rejected");
                let message = ErrorBody::parse(&body)
                    .and_then(|b| b.message)
                    .unwrap_or_else(|| format!("Upload rejected by server ({})", status.as_u16()));
                Err(ApiError::Validation(message))
            }
            _ => Err(server_error(response, "upload_document").await),
        }
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<HealthStatus> {
        let url = self.endpoint(&[])?;
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(server_error(response, "health_check").await);
        }
        Ok(serde_json::from_value(json_body(response).await?)?)
    }
}
