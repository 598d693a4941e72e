//! Webhook notifier — tells the workflow-automation service about new work.
//!
//! DESIGN
//! ======
//! Each configured endpoint receives the same JSON notice. Deliveries run
//! concurrently in a detached task and the caller never waits on them:
//! failures are logged and dropped, with no retry. Whether scoring actually
//! started is observed later through the completion poller.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
    #[error("webhook request failed: {0}")]
    Request(String),
    #[error("webhook responded with status {status}")]
    Status { status: u16 },
}

/// Payload posted to every workflow endpoint when an assessment is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssessmentNotice {
    pub assessment_id: Uuid,
    pub title: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser_id: Option<String>,
    pub documents: Vec<String>,
}

#[derive(Clone)]
pub struct WebhookNotifier {
    http: reqwest::Client,
    urls: Arc<Vec<String>>,
}

impl WebhookNotifier {
    /// Build a notifier for `urls`. An empty list yields a disabled notifier.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::HttpClientBuild`] if the HTTP client fails.
    pub fn new(urls: Vec<String>, timeout: Duration) -> Result<Self, WebhookError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| WebhookError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, urls: Arc::new(urls) })
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.urls.is_empty()
    }

    #[must_use]
    pub fn endpoint_count(&self) -> usize {
        self.urls.len()
    }

    /// Fan `notice` out to every endpoint in the background. Returns the
    /// delivery task, or `None` when no endpoints are configured.
    pub fn notify(&self, notice: AssessmentNotice) -> Option<JoinHandle<()>> {
        if !self.is_enabled() {
            return None;
        }

        let http = self.http.clone();
        let urls = self.urls.clone();
        Some(tokio::spawn(async move {
            let deliveries = urls.iter().map(|url| deliver(&http, url, &notice));
            let results = join_all(deliveries).await;

            for (url, result) in urls.iter().zip(results) {
                match result {
                    Ok(()) => info!(%url, session_id = %notice.session_id, "webhook delivered"),
                    Err(e) => warn!(%url, session_id = %notice.session_id, error = %e, "webhook delivery failed"),
                }
            }
        }))
    }
}

async fn deliver(http: &reqwest::Client, url: &str, notice: &AssessmentNotice) -> Result<(), WebhookError> {
    let response = http
        .post(url)
        .json(notice)
        .send()
        .await
        .map_err(|e| WebhookError::Request(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(WebhookError::Status { status: status.as_u16() });
    }
    Ok(())
}

#[cfg(test)]
#[path = "webhook_test.rs"]
mod tests;
