//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The browser front-end talks to this JSON API. Assessment creation fans
//! out to the workflow webhooks and starts a completion poller; session
//! routes read results, record remarks, and report the poller's verdict.

pub mod assessments;
pub mod chat;
pub mod identity;
pub mod sessions;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/identity", get(identity::identity))
        .route(
            "/api/assessments",
            get(assessments::list_assessments).post(assessments::create_assessment),
        )
        .route(
            "/api/assessments/{id}",
            get(assessments::get_assessment).patch(assessments::update_assessment),
        )
        .route("/api/sessions/{sid}/results", get(sessions::list_results))
        .route(
            "/api/sessions/{sid}/remarks",
            get(sessions::list_remarks).post(sessions::create_remark),
        )
        .route(
            "/api/sessions/{sid}/poll",
            get(sessions::poll_status)
                .post(sessions::start_poll)
                .delete(sessions::cancel_poll),
        )
        .route("/api/chat", post(chat::send_message))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
