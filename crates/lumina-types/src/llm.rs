//! Error type for text-generation backends.
//!
//! Every transport, authentication, or quota failure from a backend is
//! surfaced to the chat session as a single [`LlmError`] value.

use std::time::Duration;

/// Errors from a text-generation backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LlmError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("provider overloaded: {0}")]
    Overloaded(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("context length exceeded: max {max}, requested {requested}")]
    ContextLengthExceeded { max: u32, requested: u32 },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("generation cancelled")]
    Cancelled,
}
