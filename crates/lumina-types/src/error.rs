use std::time::Duration;

use thiserror::Error;

use crate::chat::ChatState;
use crate::llm::LlmError;

/// Errors from a context provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("{0}")]
    Failed(String),

    #[error("context generation timed out after {0:?}")]
    TimedOut(Duration),

    #[error("context generation cancelled")]
    Cancelled,
}

/// Errors returned to the caller of a chat turn.
///
/// Persistence failures are deliberately absent: they are absorbed and
/// logged inside the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// Input was rejected before anything happened. The log is unchanged.
    #[error("{0}")]
    Validation(String),

    /// The context provider failed. The log is unchanged.
    #[error("failed to generate codebase context: {0}")]
    ContextGeneration(ContextError),

    /// The backend failed after the user message was recorded.
    #[error(transparent)]
    Generation(LlmError),
}

impl ChatError {
    /// Whether the failed turn left a user message in the log.
    pub fn recorded_user_message(&self) -> bool {
        matches!(self, ChatError::Generation(_))
    }
}

/// A failed turn: the error plus the conversation as it stands afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct TurnFailure {
    pub state: ChatState,
    pub error: ChatError,
}

/// Errors from repository operations (used by trait definitions in lumina-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),
}
