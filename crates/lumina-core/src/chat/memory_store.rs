//! Process-local [`MessageStore`] implementation.
//!
//! Used when durable storage is unavailable (the conversation then lives only
//! as long as the process) and as a real store in tests. Clones share the same
//! underlying log, so a second session built from a clone sees what the first
//! one saved.

use std::sync::{Arc, Mutex, PoisonError};

use lumina_types::chat::Message;
use lumina_types::error::RepositoryError;

use super::repository::MessageStore;

/// In-memory conversation store with atomic replace semantics.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageStore {
    messages: Arc<Mutex<Vec<Message>>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `messages`.
    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self {
            messages: Arc::new(Mutex::new(messages)),
        }
    }

    /// Copy of the currently stored conversation.
    pub fn messages(&self) -> Vec<Message> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl MessageStore for InMemoryMessageStore {
    async fn load(&self) -> Result<Vec<Message>, RepositoryError> {
        Ok(self.messages())
    }

    async fn save(&self, messages: &[Message]) -> Result<(), RepositoryError> {
        let mut stored = self.messages.lock().unwrap_or_else(PoisonError::into_inner);
        *stored = messages.to_vec();
        Ok(())
    }
}
