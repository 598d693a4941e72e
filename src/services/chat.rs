//! Chat relay — forwards assistant messages to the hosted chat webhook.
//!
//! The webhook answers either with plain text or with a JSON object carrying
//! a `message` field; both are reduced to a single reply string here.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat message is empty")]
    EmptyMessage,
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
    #[error("chat request failed: {0}")]
    Request(String),
    #[error("chat webhook responded with status {status}")]
    Response { status: u16, body: String },
    #[error("chat webhook returned an empty reply")]
    EmptyReply,
}

impl ChatError {
    /// Upstream failures, as opposed to bad input.
    #[must_use]
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Response { .. } | Self::EmptyReply)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
    pub chat_id: String,
}

/// Provider-neutral chat seam. Enables mocking in handler tests.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one user message and return the assistant's reply.
    ///
    /// # Errors
    ///
    /// Returns a [`ChatError`] if the request fails or the reply is empty.
    async fn send(&self, request: &ChatRequest) -> Result<String, ChatError>;
}

pub struct WebhookChat {
    http: reqwest::Client,
    url: String,
}

impl WebhookChat {
    /// # Errors
    ///
    /// Returns [`ChatError::HttpClientBuild`] if the HTTP client fails.
    pub fn new(url: String, timeout: Duration) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ChatError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, url })
    }
}

#[async_trait::async_trait]
impl ChatBackend for WebhookChat {
    async fn send(&self, request: &ChatRequest) -> Result<String, ChatError> {
        let response = self
            .http
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| ChatError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ChatError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(ChatError::Response { status, body: text });
        }

        parse_chat_reply(&text).ok_or(ChatError::EmptyReply)
    }
}

/// Reduce a webhook body to the reply text.
///
/// - `{"message": "..."}` yields the message.
/// - A bare JSON string yields its contents.
/// - Anything else is treated as plain text.
#[must_use]
pub fn parse_chat_reply(body: &str) -> Option<String> {
    let reply = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("message") {
            Some(Value::String(message)) => message.clone(),
            _ => body.to_owned(),
        },
        Ok(Value::String(s)) => s,
        _ => body.to_owned(),
    };

    let reply = reply.trim();
    if reply.is_empty() { None } else { Some(reply.to_owned()) }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
