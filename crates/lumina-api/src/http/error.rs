//! Application error type mapping to HTTP status codes and envelope format.

use std::time::Instant;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use lumina_types::chat::ChatState;
use lumina_types::error::{ChatError, ContextError, TurnFailure};
use lumina_types::llm::LlmError;

use super::response::{ApiMeta, ApiResponse};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// A chat turn failed; the envelope carries the conversation as it now stands.
    Turn { failure: TurnFailure, start: Instant },
    /// Malformed request body.
    Validation(String),
}

impl AppError {
    pub fn turn(failure: TurnFailure, start: Instant) -> Self {
        AppError::Turn { failure, start }
    }
}

/// HTTP status and machine-readable code for a failed turn.
pub fn chat_error_status(error: &ChatError) -> (StatusCode, &'static str) {
    match error {
        ChatError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        ChatError::ContextGeneration(ContextError::TimedOut(_)) => {
            (StatusCode::GATEWAY_TIMEOUT, "CONTEXT_TIMEOUT")
        }
        ChatError::ContextGeneration(ContextError::Cancelled)
        | ChatError::Generation(LlmError::Cancelled) => {
            (StatusCode::SERVICE_UNAVAILABLE, "CANCELLED")
        }
        ChatError::ContextGeneration(ContextError::Failed(_)) => {
            (StatusCode::BAD_GATEWAY, "CONTEXT_GENERATION_FAILED")
        }
        ChatError::Generation(LlmError::Timeout(_)) => {
            (StatusCode::GATEWAY_TIMEOUT, "GENERATION_TIMEOUT")
        }
        ChatError::Generation(LlmError::RateLimited { .. }) => {
            (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED")
        }
        ChatError::Generation(_) => (StatusCode::BAD_GATEWAY, "GENERATION_FAILED"),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Turn { failure, start } => {
                let (status, code) = chat_error_status(&failure.error);
                ApiResponse::failure(
                    Some(failure.state),
                    code,
                    failure.error.to_string(),
                    ApiMeta::since(start),
                )
                .into_response_with(status)
            }
            AppError::Validation(message) => ApiResponse::<ChatState>::failure(
                None,
                "VALIDATION_ERROR",
                message,
                ApiMeta::since(Instant::now()),
            )
            .into_response_with(StatusCode::BAD_REQUEST),
        }
    }
}
