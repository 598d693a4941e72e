//! Service configuration parsed from environment variables.
//!
//! Everything is read once at startup. Numeric values that are missing or
//! fail to parse fall back to their defaults rather than aborting.

use std::time::Duration;

use crate::services::poller::PollConfig;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CHAT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_POLL_MAX_WAIT_SECS: u64 = 600;
pub const DEFAULT_POLL_STABLE_POLLS: u32 = 3;
pub const DEFAULT_POLL_RETENTION_SECS: u64 = 900;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    /// Workflow-automation endpoints notified when an assessment is created.
    pub webhook_urls: Vec<String>,
    pub webhook_timeout: Duration,
    /// Chat webhook. Chat routes are disabled when absent.
    pub chat_webhook_url: Option<String>,
    pub chat_timeout: Duration,
    pub poll: PollConfig,
    /// How long settled poll verdicts stay queryable.
    pub poll_retention: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(&'static str),
}

impl AppConfig {
    /// Build config from environment variables.
    ///
    /// Required:
    /// - `DATABASE_URL`
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `WEBHOOK_URLS`: comma-separated list, empty disables notifications
    /// - `WEBHOOK_TIMEOUT_SECS`: default 30
    /// - `CHAT_WEBHOOK_URL`: chat relay target
    /// - `CHAT_TIMEOUT_SECS`: default 60
    /// - `POLL_INTERVAL_SECS`: default 10
    /// - `POLL_MAX_WAIT_SECS`: default 600
    /// - `POLL_STABLE_POLLS`: default 3
    /// - `POLL_RETENTION_SECS`: default 900
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `DATABASE_URL` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let webhook_urls = parse_url_list(std::env::var("WEBHOOK_URLS").ok().as_deref());
        let chat_webhook_url = std::env::var("CHAT_WEBHOOK_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let poll = PollConfig {
            interval: Duration::from_secs(env_parse("POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)),
            max_wait: Duration::from_secs(env_parse("POLL_MAX_WAIT_SECS", DEFAULT_POLL_MAX_WAIT_SECS)),
            stable_polls: env_parse("POLL_STABLE_POLLS", DEFAULT_POLL_STABLE_POLLS).max(1),
        };

        Ok(Self {
            database_url,
            port: env_parse("PORT", DEFAULT_PORT),
            webhook_urls,
            webhook_timeout: Duration::from_secs(env_parse("WEBHOOK_TIMEOUT_SECS", DEFAULT_WEBHOOK_TIMEOUT_SECS)),
            chat_webhook_url,
            chat_timeout: Duration::from_secs(env_parse("CHAT_TIMEOUT_SECS", DEFAULT_CHAT_TIMEOUT_SECS)),
            poll,
            poll_retention: Duration::from_secs(env_parse("POLL_RETENTION_SECS", DEFAULT_POLL_RETENTION_SECS)),
        })
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_url_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
