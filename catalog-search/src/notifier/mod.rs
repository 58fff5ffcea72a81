//! Best-effort alerting for failed syncs.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::NotifyError;

/// Receives a report for every product that could not be synced.
///
/// Callers ignore the result beyond logging it; a notifier failure never
/// affects the sync it reports on.
#[async_trait]
pub trait FailureNotifier: Send + Sync {
    async fn notify_sync_failure(
        &self,
        product_id: i64,
        product_title: &str,
        error_message: &str,
    ) -> Result<(), NotifyError>;
}

/// Notifier that only writes a structured log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl FailureNotifier for LogNotifier {
    async fn notify_sync_failure(
        &self,
        product_id: i64,
        product_title: &str,
        error_message: &str,
    ) -> Result<(), NotifyError> {
        warn!(
            product_id = product_id,
            title = %product_title,
            error = %error_message,
            "Product search sync failed"
        );
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SyncFailurePayload<'a> {
    product_id: i64,
    product_title: &'a str,
    error: &'a str,
}

/// Notifier that POSTs a JSON report to a webhook.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    const TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Self::TIMEOUT)
            .build()
            .map_err(|e| NotifyError::transport(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl FailureNotifier for WebhookNotifier {
    async fn notify_sync_failure(
        &self,
        product_id: i64,
        product_title: &str,
        error_message: &str,
    ) -> Result<(), NotifyError> {
        let payload = SyncFailurePayload {
            product_id,
            product_title,
            error: error_message,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected(status.as_u16()));
        }

        debug!(product_id = product_id, "Sync failure notification delivered");
        Ok(())
    }
}
