//! Assessment routes — creation flow and detail views.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::assessment::{self, Assessment, AssessmentDocument, AssessmentError, AssessmentStatus, NewDocument};
use crate::services::ident;
use crate::services::poller::PollState;
use crate::services::webhook::AssessmentNotice;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateAssessmentBody {
    pub title: String,
    #[serde(default)]
    pub documents: Vec<NewDocument>,
    /// Persistent per-browser id, forwarded to the workflow.
    #[serde(default)]
    pub browser_id: Option<String>,
    /// Upload session id; generated when absent or malformed.
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Serialize)]
pub struct CreateAssessmentResponse {
    pub assessment: Assessment,
    pub session_id: String,
    pub documents: Vec<AssessmentDocument>,
    /// `None` when no documents were registered and nothing is polled.
    pub poll: Option<PollState>,
}

#[derive(Serialize)]
pub struct AssessmentDetail {
    pub assessment: Assessment,
    pub documents: Vec<AssessmentDocument>,
}

#[derive(Deserialize)]
pub struct UpdateAssessmentBody {
    pub status: AssessmentStatus,
}

/// `GET /api/assessments` — list assessments, newest first.
pub async fn list_assessments(State(state): State<AppState>) -> Result<Json<Vec<Assessment>>, StatusCode> {
    let rows = assessment::list_assessments(&state.pool)
        .await
        .map_err(assessment_error_to_status)?;
    Ok(Json(rows))
}

/// `POST /api/assessments` — create an assessment, register its documents,
/// notify the workflow, and start polling for results.
pub async fn create_assessment(
    State(state): State<AppState>,
    Json(body): Json<CreateAssessmentBody>,
) -> Result<(StatusCode, Json<CreateAssessmentResponse>), StatusCode> {
    let title = assessment::normalize_title(&body.title).map_err(assessment_error_to_status)?;
    assessment::validate_documents(&body.documents).map_err(assessment_error_to_status)?;

    let session_id = ident::reuse_or_generate(body.session_id.as_deref());
    let browser_id = body
        .browser_id
        .as_deref()
        .map(str::trim)
        .filter(|id| ident::is_valid_id(id))
        .map(ToOwned::to_owned);

    let (created, documents) = assessment::create_assessment(&state.pool, &title, &session_id, &body.documents)
        .await
        .map_err(assessment_error_to_status)?;

    tracing::info!(assessment_id = %created.id, %session_id, documents = documents.len(), "assessment created");

    let poll = if documents.is_empty() {
        None
    } else {
        state.webhooks.notify(AssessmentNotice {
            assessment_id: created.id,
            title: created.title.clone(),
            session_id: session_id.clone(),
            browser_id,
            documents: documents.iter().map(|d| d.file_name.clone()).collect(),
        });
        state
            .pollers
            .start(state.counter.clone(), &session_id, state.poll_config)
            .await;
        Some(PollState::Polling)
    };

    Ok((StatusCode::CREATED, Json(CreateAssessmentResponse { assessment: created, session_id, documents, poll })))
}

/// `GET /api/assessments/:id` — one assessment with its documents.
pub async fn get_assessment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AssessmentDetail>, StatusCode> {
    let found = assessment::get_assessment(&state.pool, id)
        .await
        .map_err(assessment_error_to_status)?;
    let documents = assessment::list_documents(&state.pool, id)
        .await
        .map_err(assessment_error_to_status)?;
    Ok(Json(AssessmentDetail { assessment: found, documents }))
}

/// `PATCH /api/assessments/:id` — set the assessment status.
pub async fn update_assessment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateAssessmentBody>,
) -> Result<StatusCode, StatusCode> {
    assessment::update_status(&state.pool, id, body.status)
        .await
        .map_err(assessment_error_to_status)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) fn assessment_error_to_status(err: AssessmentError) -> StatusCode {
    match err {
        AssessmentError::NotFound(_) => StatusCode::NOT_FOUND,
        AssessmentError::EmptyTitle | AssessmentError::EmptyFileName => StatusCode::BAD_REQUEST,
        AssessmentError::Database(e) => {
            tracing::error!(error = %e, "assessment query failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
#[path = "assessments_test.rs"]
mod tests;
