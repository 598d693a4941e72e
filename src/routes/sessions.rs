//! Session routes — results, reviewer remarks, and completion polling.
//!
//! Every route is keyed by the upload session id, which must have the shape
//! of a generated identifier.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::services::ident;
use crate::services::poller::PollState;
use crate::services::remarks::{self, NewRemark, Remark, RemarkError};
use crate::services::results::{self, AiOutput, ResultSummary};
use crate::state::AppState;

#[derive(Serialize)]
pub struct ResultsResponse {
    pub session_id: String,
    pub summary: ResultSummary,
    pub results: Vec<AiOutput>,
}

#[derive(Deserialize)]
pub struct RemarksQuery {
    pub criterion: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PollStatusResponse {
    pub session_id: String,
    pub state: PollState,
    /// Next view for the client once the poll has settled.
    pub route: Option<String>,
}

impl PollStatusResponse {
    fn new(session_id: String, state: PollState) -> Self {
        let route = state.route(&session_id);
        Self { session_id, state, route }
    }
}

fn checked_session_id(raw: &str) -> Result<&str, StatusCode> {
    if ident::is_valid_id(raw) { Ok(raw) } else { Err(StatusCode::BAD_REQUEST) }
}

/// `GET /api/sessions/:sid/results` — scored criteria with a pass/fail tally.
pub async fn list_results(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ResultsResponse>, StatusCode> {
    checked_session_id(&session_id)?;

    let rows = results::list_results(&state.pool, &session_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, %session_id, "results query failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let summary = results::summarize(&rows);
    Ok(Json(ResultsResponse { session_id, summary, results: rows }))
}

/// `GET /api/sessions/:sid/remarks` — reviewer remarks, optionally for one criterion.
pub async fn list_remarks(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<RemarksQuery>,
) -> Result<Json<Vec<Remark>>, StatusCode> {
    checked_session_id(&session_id)?;

    let criterion = query
        .criterion
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let rows = remarks::list_remarks(&state.pool, &session_id, criterion)
        .await
        .map_err(remark_error_to_status)?;
    Ok(Json(rows))
}

/// `POST /api/sessions/:sid/remarks` — add a reviewer remark.
pub async fn create_remark(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<NewRemark>,
) -> Result<(StatusCode, Json<Remark>), StatusCode> {
    checked_session_id(&session_id)?;

    let remark = remarks::create_remark(&state.pool, &session_id, body)
        .await
        .map_err(remark_error_to_status)?;
    Ok((StatusCode::CREATED, Json(remark)))
}

/// `POST /api/sessions/:sid/poll` — start a background completion poller.
/// Answers 202 when a poller was started, 200 when one was already running.
pub async fn start_poll(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<(StatusCode, Json<PollStatusResponse>), StatusCode> {
    checked_session_id(&session_id)?;

    let started = state
        .pollers
        .start(state.counter.clone(), &session_id, state.poll_config)
        .await;
    let current = state
        .pollers
        .status(&session_id)
        .await
        .unwrap_or(PollState::Polling);

    let code = if started { StatusCode::ACCEPTED } else { StatusCode::OK };
    Ok((code, Json(PollStatusResponse::new(session_id, current))))
}

/// `GET /api/sessions/:sid/poll` — current poller state and route target.
pub async fn poll_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<PollStatusResponse>, StatusCode> {
    checked_session_id(&session_id)?;

    let current = state
        .pollers
        .status(&session_id)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(PollStatusResponse::new(session_id, current)))
}

/// `DELETE /api/sessions/:sid/poll` — cancel and forget the poller.
pub async fn cancel_poll(State(state): State<AppState>, Path(session_id): Path<String>) -> StatusCode {
    if checked_session_id(&session_id).is_err() {
        return StatusCode::BAD_REQUEST;
    }

    if state.pollers.cancel(&session_id).await {
        tracing::info!(%session_id, "session poll cancelled by client");
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

pub(crate) fn remark_error_to_status(err: RemarkError) -> StatusCode {
    match err {
        RemarkError::EmptyComment | RemarkError::EmptyCriterion => StatusCode::BAD_REQUEST,
        RemarkError::Database(e) => {
            tracing::error!(error = %e, "remark query failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
#[path = "sessions_test.rs"]
mod tests;
