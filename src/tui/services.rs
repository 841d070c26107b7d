use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::core::api::{ApiError, DocumentApi, HttpDocumentClient};
use crate::core::workflow::UploadPolicy;

use super::events::{AppEvent, Notification, NotificationLevel};

/// Handle to the backend API and the app event channel.
///
/// Created once at startup and passed by reference to views; background
/// tasks clone `api` and `event_tx`.
pub struct Services {
    pub api: Arc<dyn DocumentApi>,
    pub upload_policy: UploadPolicy,
    pub event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl Services {
    /// Build the HTTP client from config.
    pub fn init(
        config: &AppConfig,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Result<Self, ApiError> {
        let client = HttpDocumentClient::new(&config.api, &config.upload)?;
        tracing::info!(base_url = %client.base_url(), "API client initialized");
        Ok(Self::with_api(Arc::new(client), config, event_tx))
    }

    pub fn with_api(
        api: Arc<dyn DocumentApi>,
        config: &AppConfig,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            api,
            upload_policy: UploadPolicy::from_config(&config.upload),
            event_tx,
        }
    }

    /// Queue a notification for the overlay.
    pub fn notify(&self, message: impl Into<String>, level: NotificationLevel) {
        let _ = self.event_tx.send(AppEvent::Notification(Notification {
            id: 0, // Assigned by AppState
            message: message.into(),
            level,
            ttl_ticks: 60,
        }));
    }
}
