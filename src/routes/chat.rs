//! Chat assistant route.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::services::chat::{ChatError, ChatRequest};
use crate::services::ident;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ChatBody {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
    /// Conversation id; a new conversation starts when absent.
    #[serde(default)]
    pub chat_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
    pub session_id: String,
    pub chat_id: String,
}

/// `POST /api/chat` — relay a message to the chat webhook.
pub async fn send_message(
    State(state): State<AppState>,
    Json(body): Json<ChatBody>,
) -> Result<Json<ChatReply>, StatusCode> {
    let Some(chat) = state.chat.as_ref() else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    let message = body.message.trim();
    if message.is_empty() {
        return Err(chat_error_to_status(ChatError::EmptyMessage));
    }

    let request = ChatRequest {
        message: message.to_owned(),
        session_id: ident::reuse_or_generate(body.session_id.as_deref()),
        chat_id: ident::reuse_or_generate(body.chat_id.as_deref()),
    };

    let reply = chat.send(&request).await.map_err(chat_error_to_status)?;
    Ok(Json(ChatReply { reply, session_id: request.session_id, chat_id: request.chat_id }))
}

pub(crate) fn chat_error_to_status(err: ChatError) -> StatusCode {
    if err.is_upstream() {
        tracing::warn!(error = %err, "chat webhook failed");
        return StatusCode::BAD_GATEWAY;
    }
    match err {
        ChatError::EmptyMessage => StatusCode::BAD_REQUEST,
        other => {
            tracing::error!(error = %other, "chat relay failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
