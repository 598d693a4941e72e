//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the database pool, the outbound webhook and chat clients, and
//! the registry of background completion pollers. The result counter the
//! pollers use is a trait object so tests can script counts without a
//! database.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::services::chat::ChatBackend;
use crate::services::poller::{PollConfig, PollRegistry, ResultCounter};
use crate::services::webhook::WebhookNotifier;

/// Shared application state. Clone is required by Axum; every field is
/// cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Source of per-session result counts for the poller.
    pub counter: Arc<dyn ResultCounter>,
    pub pollers: PollRegistry,
    pub poll_config: PollConfig,
    pub webhooks: WebhookNotifier,
    /// Optional chat relay. `None` if `CHAT_WEBHOOK_URL` is not configured.
    pub chat: Option<Arc<dyn ChatBackend>>,
}

impl AppState {
    #[must_use]
    pub fn new(
        pool: PgPool,
        webhooks: WebhookNotifier,
        chat: Option<Arc<dyn ChatBackend>>,
        poll_config: PollConfig,
        poll_retention: Duration,
    ) -> Self {
        let counter: Arc<dyn ResultCounter> = Arc::new(pool.clone());
        let pollers = PollRegistry::with_retention(poll_retention);
        Self { pool, counter, pollers, poll_config, webhooks, chat }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
