//! Chat handlers: read the conversation and run a turn.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Deserialize;
use tracing::info;

use lumina_types::chat::ChatState;

use crate::http::error::AppError;
use crate::http::response::{ApiMeta, ApiResponse};
use crate::state::AppState;

/// Body of `POST /api/v1/chat/messages`.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

/// GET /api/v1/chat - Current conversation snapshot.
pub async fn get_chat(State(state): State<AppState>) -> Json<ApiResponse<ChatState>> {
    let start = Instant::now();
    let snapshot = state.session.get_state();

    Json(ApiResponse::success(snapshot, ApiMeta::since(start)).with_link("self", "/api/v1/chat"))
}

/// POST /api/v1/chat/messages - Run one turn.
///
/// On failure the envelope still carries the conversation in `data`, so a
/// client can tell whether its message was recorded.
pub async fn send_message(
    State(state): State<AppState>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ChatState>>, AppError> {
    let start = Instant::now();
    let Json(body) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    let snapshot = state
        .session
        .send_message_with_cancel(&body.message, &state.shutdown)
        .await
        .map_err(|failure| AppError::turn(failure, start))?;

    info!(messages = snapshot.len(), elapsed_ms = start.elapsed().as_millis() as u64, "Turn served");
    Ok(Json(
        ApiResponse::success(snapshot, ApiMeta::since(start)).with_link("self", "/api/v1/chat"),
    ))
}
