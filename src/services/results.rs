//! Results service — per-criterion AI outputs written by the scoring workflow.
//!
//! Rows in `ai_output` are produced externally; this module only reads them.

use serde::Serialize;
use sqlx::PgPool;

use super::poller::ResultCounter;

/// One scored criterion for a session.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct AiOutput {
    pub id: i64,
    pub session_id: String,
    pub criterion: String,
    pub performance: Option<f64>,
    pub threshold: Option<f64>,
    /// `None` while the workflow has not produced a verdict for this row.
    pub passed: Option<bool>,
    pub context: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResultSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

/// Count result rows for a session.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn count_results(pool: &PgPool, session_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ai_output WHERE session_id = $1")
        .bind(session_id)
        .fetch_one(pool)
        .await
}

/// List result rows for a session, ordered by criterion.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_results(pool: &PgPool, session_id: &str) -> Result<Vec<AiOutput>, sqlx::Error> {
    sqlx::query_as::<_, AiOutput>(
        "SELECT id, session_id, criterion, performance, threshold, passed, context
         FROM ai_output
         WHERE session_id = $1
         ORDER BY criterion ASC, id ASC",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await
}

/// Tally pass/fail outcomes. Rows without a verdict count toward `total` only.
#[must_use]
pub fn summarize(rows: &[AiOutput]) -> ResultSummary {
    rows.iter().fold(ResultSummary::default(), |mut acc, row| {
        acc.total += 1;
        match row.passed {
            Some(true) => acc.passed += 1,
            Some(false) => acc.failed += 1,
            None => {}
        }
        acc
    })
}

#[async_trait::async_trait]
impl ResultCounter for PgPool {
    async fn count_results(&self, session_id: &str) -> Result<i64, sqlx::Error> {
        count_results(self, session_id).await
    }
}

#[cfg(test)]
#[path = "results_test.rs"]
mod tests;
