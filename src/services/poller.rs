//! Completion poller — decides when external scoring of a session is done.
//!
//! DESIGN
//! ======
//! The workflow-automation service writes one `ai_output` row per criterion
//! and never calls back. The poller counts rows for the session on a fixed
//! interval and declares completion once the same nonzero count has been
//! seen on `stable_polls` consecutive cycles. A zero count never counts
//! toward stability: scoring has not started yet.
//!
//! `PollTracker` is the pure stability step; `wait_for_completion` drives it
//! against a `ResultCounter` with a time bound and a cancellation channel;
//! `PollRegistry` runs one background poller per session so clients can
//! navigate away and come back for the verdict, which it keeps for a
//! retention window after settling.
//!
//! TRADE-OFFS
//! ==========
//! This is a heuristic. Results that pause for exactly `stable_polls`
//! intervals read as complete; a slow but progressing run reads as timed out.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{RwLock, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between count queries.
    pub interval: Duration,
    /// Total time bound before reporting a timeout.
    pub max_wait: Duration,
    /// Consecutive equal nonzero observations required for completion.
    pub stable_polls: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval: Duration::from_secs(10), max_wait: Duration::from_secs(600), stable_polls: 3 }
    }
}

// =============================================================================
// STATE MACHINE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollState {
    Polling,
    Completed,
    TimedOut,
}

impl PollState {
    /// Where the client should go next, once the poll has settled.
    #[must_use]
    pub fn route(self, session_id: &str) -> Option<String> {
        match self {
            Self::Polling => None,
            Self::Completed => Some(format!("/results/{session_id}")),
            Self::TimedOut => Some("/dashboard".to_owned()),
        }
    }
}

/// Tracks consecutive equal observations of the result count.
#[derive(Debug, Clone)]
pub struct PollTracker {
    stable_polls: u32,
    previous: Option<i64>,
    streak: u32,
}

impl PollTracker {
    #[must_use]
    pub fn new(stable_polls: u32) -> Self {
        Self { stable_polls: stable_polls.max(1), previous: None, streak: 0 }
    }

    /// Feed one count observation and return the resulting state.
    pub fn observe(&mut self, count: i64) -> PollState {
        if count <= 0 {
            self.previous = Some(count);
            self.streak = 0;
            return PollState::Polling;
        }

        if self.previous == Some(count) {
            self.streak += 1;
        } else {
            self.previous = Some(count);
            self.streak = 1;
        }

        if self.streak >= self.stable_polls { PollState::Completed } else { PollState::Polling }
    }

    /// A failed query breaks the streak: the cycles around it are no longer
    /// known to be consecutive.
    pub fn observe_error(&mut self) {
        self.previous = None;
        self.streak = 0;
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }
}

// =============================================================================
// COUNTER TRAIT
// =============================================================================

/// Source of the per-session result count. Implemented for `PgPool`;
/// mocked in tests.
#[async_trait::async_trait]
pub trait ResultCounter: Send + Sync {
    /// Count result rows recorded for `session_id`.
    ///
    /// # Errors
    ///
    /// Returns the underlying database error when the query fails.
    async fn count_results(&self, session_id: &str) -> Result<i64, sqlx::Error>;
}

// =============================================================================
// DRIVER
// =============================================================================

const MAX_BOUND: Duration = Duration::from_secs(60 * 60 * 24 * 365);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Completed,
    TimedOut,
    Cancelled,
}

/// Poll `counter` until the count for `session_id` stabilizes, the time
/// bound elapses, or `cancel` flips.
pub async fn wait_for_completion(
    counter: &dyn ResultCounter,
    session_id: &str,
    config: PollConfig,
    cancel: &mut watch::Receiver<bool>,
) -> PollOutcome {
    let started = Instant::now();
    // Clamp absurd bounds instead of overflowing the clock.
    let deadline = started.checked_add(config.max_wait).unwrap_or_else(|| started + MAX_BOUND);
    let mut tracker = PollTracker::new(config.stable_polls);

    while Instant::now() < deadline {
        if *cancel.borrow() {
            return PollOutcome::Cancelled;
        }

        // A query still pending at the deadline counts as a timeout.
        let Ok(counted) = tokio::time::timeout_at(deadline, counter.count_results(session_id)).await else {
            warn!(%session_id, "result count still pending at the time bound");
            break;
        };

        match counted {
            Ok(count) => {
                let state = tracker.observe(count);
                debug!(%session_id, count, streak = tracker.streak(), "poll cycle");
                if state == PollState::Completed {
                    info!(%session_id, count, elapsed_ms = started.elapsed().as_millis(), "session results stable");
                    return PollOutcome::Completed;
                }
            }
            Err(e) => {
                warn!(%session_id, error = %e, "result count failed; retrying next cycle");
                tracker.observe_error();
            }
        }

        let wake = Instant::now().checked_add(config.interval).map_or(deadline, |t| t.min(deadline));
        tokio::select! {
            () = tokio::time::sleep_until(wake) => {}
            _ = cancel.changed() => return PollOutcome::Cancelled,
        }
    }

    info!(%session_id, max_wait_secs = config.max_wait.as_secs(), "session poll timed out");
    PollOutcome::TimedOut
}

// =============================================================================
// BACKGROUND REGISTRY
// =============================================================================

/// How long a settled verdict stays queryable before the registry forgets it.
pub const DEFAULT_SETTLED_RETENTION: Duration = Duration::from_secs(15 * 60);

struct PollHandle {
    state: watch::Receiver<PollState>,
    cancel: watch::Sender<bool>,
}

/// Background pollers keyed by session id. Settled entries are dropped
/// `retention` after they settle; cancelled ones immediately.
#[derive(Clone)]
pub struct PollRegistry {
    inner: Arc<RwLock<HashMap<String, PollHandle>>>,
    retention: Duration,
}

impl Default for PollRegistry {
    fn default() -> Self {
        Self::with_retention(DEFAULT_SETTLED_RETENTION)
    }
}

impl PollRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_retention(retention: Duration) -> Self {
        Self { inner: Arc::new(RwLock::new(HashMap::new())), retention }
    }

    /// Number of sessions currently tracked, polling or settled.
    #[cfg(test)]
    pub(crate) async fn tracked_sessions(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Start a background poller for `session_id`. Returns `false` when one
    /// is already polling; a settled poller is replaced.
    pub async fn start(&self, counter: Arc<dyn ResultCounter>, session_id: &str, config: PollConfig) -> bool {
        let mut pollers = self.inner.write().await;
        if let Some(existing) = pollers.get(session_id) {
            if *existing.state.borrow() == PollState::Polling {
                return false;
            }
        }

        let (state_tx, state_rx) = watch::channel(PollState::Polling);
        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        pollers.insert(session_id.to_owned(), PollHandle { state: state_rx.clone(), cancel: cancel_tx });

        let inner = Arc::clone(&self.inner);
        let retention = self.retention;
        let session_id = session_id.to_owned();
        tokio::spawn(async move {
            let settled = match wait_for_completion(counter.as_ref(), &session_id, config, &mut cancel_rx).await {
                PollOutcome::Completed => PollState::Completed,
                PollOutcome::TimedOut => PollState::TimedOut,
                PollOutcome::Cancelled => {
                    debug!(%session_id, "session poll cancelled");
                    return;
                }
            };
            state_tx.send_replace(settled);
            drop(counter);

            tokio::time::sleep(retention).await;
            let mut pollers = inner.write().await;
            // A restart may have replaced this entry in the meantime.
            if pollers.get(&session_id).is_some_and(|h| h.state.same_channel(&state_rx)) {
                pollers.remove(&session_id);
                debug!(%session_id, "settled poll forgotten");
            }
        });

        true
    }

    /// Current state of the poller for `session_id`, if one was started.
    pub async fn status(&self, session_id: &str) -> Option<PollState> {
        let pollers = self.inner.read().await;
        pollers.get(session_id).map(|h| *h.state.borrow())
    }

    /// Stop and forget the poller for `session_id`. Returns `false` when
    /// there was none.
    pub async fn cancel(&self, session_id: &str) -> bool {
        let removed = self.inner.write().await.remove(session_id);
        match removed {
            Some(handle) => {
                handle.cancel.send_replace(true);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "poller_test.rs"]
mod tests;
