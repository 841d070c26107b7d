//! Upload workflow: `Idle → Uploading(progress) → Done(id) | Failed(message)`.
//!
//! A file that fails the local pre-flight goes straight to `Failed` without
//! touching the network. `Failed` (and `Done`) accept a new file.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use super::navigation::Route;
use crate::config::UploadConfig;
use crate::core::api::{ApiError, DocumentApi, DocumentId, ProgressFn, UploadFile, UploadReceipt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Uploading { file_name: String, progress: u8 },
    Done { id: DocumentId },
    Failed { message: String },
}

/// Client-side checks run before an upload is attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub allowed_extensions: Vec<String>,
    pub max_size_bytes: u64,
}

impl UploadPolicy {
    pub fn from_config(config: &UploadConfig) -> Self {
        Self {
            allowed_extensions: config
                .allowed_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            max_size_bytes: config.max_size_bytes,
        }
    }

    /// Validate a selected file, returning the user-facing reason on failure.
    pub fn check(&self, file: &UploadFile) -> Result<(), String> {
        let allowed = file
            .extension()
            .is_some_and(|ext| self.allowed_extensions.iter().any(|a| *a == ext));
        if !allowed {
            return Err(format!(
                "Unsupported file type. Allowed: {}",
                self.allowed_extensions
                    .iter()
                    .map(|e| format!(".{e}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }
        if file.is_empty() {
            return Err("The selected file is empty.".to_string());
        }
        if file.len() > self.max_size_bytes {
            return Err(format!(
                "File is too large ({:.1} MB, limit {:.0} MB).",
                file.len() as f64 / (1024.0 * 1024.0),
                self.max_size_bytes as f64 / (1024.0 * 1024.0)
            ));
        }
        Ok(())
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::from_config(&UploadConfig::default())
    }
}

pub struct UploadWorkflow {
    state: UploadState,
    policy: UploadPolicy,
    /// Progress values observed during the current upload.
    history: Vec<u8>,
}

impl UploadWorkflow {
    pub fn new(policy: UploadPolicy) -> Self {
        Self {
            state: UploadState::Idle,
            policy,
            history: Vec::new(),
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self.state, UploadState::Uploading { .. })
    }

    /// Current percentage (0 unless uploading or done).
    pub fn progress(&self) -> u8 {
        match self.state {
            UploadState::Uploading { progress, .. } => progress,
            UploadState::Done { .. } => 100,
            _ => 0,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            UploadState::Failed { message } => Some(message),
            _ => None,
        }
    }

    pub fn history(&self) -> &[u8] {
        &self.history
    }

    /// Accept a selected file. Returns true if the caller should now send it.
    ///
    /// Ignored while another upload is in flight. A file failing pre-flight
    /// moves directly to `Failed`.
    pub fn begin(&mut self, file: &UploadFile) -> bool {
        if self.is_uploading() {
            warn!(file = %file.file_name, "upload already in progress, ignoring selection");
            return false;
        }
        if let Err(message) = self.policy.check(file) {
            info!(file = %file.file_name, %message, "upload rejected by pre-flight");
            self.reject(message);
            return false;
        }
        self.history.clear();
        self.history.push(0);
        self.state = UploadState::Uploading {
            file_name: file.file_name.clone(),
            progress: 0,
        };
        true
    }

    /// Fail without a network call (e.g. the file picker reported an error).
    pub fn reject(&mut self, message: impl Into<String>) {
        self.history.clear();
        self.state = UploadState::Failed {
            message: message.into(),
        };
    }

    /// Record a progress tick. Values never move backwards.
    pub fn on_progress(&mut self, percent: u8) {
        if let UploadState::Uploading { progress, .. } = &mut self.state {
            let next = percent.min(100).max(*progress);
            if next != *progress {
                *progress = next;
                self.history.push(next);
            }
        }
    }

    /// Apply the upload outcome. On success returns the detail route for the
    /// new document.
    pub fn finish(&mut self, result: Result<UploadReceipt, ApiError>) -> Option<Route> {
        if !self.is_uploading() {
            return None;
        }
        match result {
            Ok(receipt) => {
                self.on_progress(100);
                info!(id = %receipt.id, "upload complete");
                let route = Route::Document(receipt.id.clone());
                self.state = UploadState::Done { id: receipt.id };
                Some(route)
            }
            Err(err) => {
                warn!(
                    error = %err,
                    status = ?err.status(),
                    body = err.body().unwrap_or_default(),
                    "upload failed"
                );
                self.state = UploadState::Failed {
                    message: err.upload_message(),
                };
                None
            }
        }
    }

    /// Drive a whole upload against `api`.
    pub async fn run(&mut self, api: &dyn DocumentApi, file: UploadFile) -> Option<Route> {
        self.run_observed(api, file, |_| {}).await
    }

    /// Like [`run`](Self::run), applying progress ticks while the request is
    /// in flight and passing every state change to `observe`.
    pub async fn run_observed<F>(
        &mut self,
        api: &dyn DocumentApi,
        file: UploadFile,
        mut observe: F,
    ) -> Option<Route>
    where
        F: FnMut(&UploadState),
    {
        if !self.begin(&file) {
            observe(&self.state);
            return None;
        }
        observe(&self.state);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let on_progress: ProgressFn = Arc::new(move |p| {
            let _ = tx.send(p);
        });
        let request = api.upload_document(file, on_progress);
        tokio::pin!(request);

        let result = loop {
            tokio::select! {
                biased;
                Some(p) = rx.recv() => self.apply_tick(p, &mut observe),
                result = &mut request => break result,
            }
        };
        while let Ok(p) = rx.try_recv() {
            self.apply_tick(p, &mut observe);
        }

        let route = self.finish(result);
        observe(&self.state);
        route
    }

    fn apply_tick<F: FnMut(&UploadState)>(&mut self, percent: u8, observe: &mut F) {
        let before = self.progress();
        self.on_progress(percent);
        if self.progress() != before {
            observe(&self.state);
        }
    }
}

impl Default for UploadWorkflow {
    fn default() -> Self {
        Self::new(UploadPolicy::default())
    }
}
