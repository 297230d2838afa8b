//! Conversation store selection.
//!
//! Prefers the SQLite store in the data directory. When the database cannot
//! be opened the conversation is kept in memory for the life of the process.

use std::path::Path;

use lumina_core::chat::memory_store::InMemoryMessageStore;
use lumina_core::chat::repository::MessageStore;
use lumina_types::chat::Message;
use lumina_types::error::RepositoryError;
use tracing::{info, warn};

use crate::sqlite::message::SqliteMessageStore;
use crate::sqlite::pool::DatabasePool;

/// The store a session persists to.
#[derive(Clone)]
pub enum ConversationStore {
    Sqlite(SqliteMessageStore),
    Memory(InMemoryMessageStore),
}

impl ConversationStore {
    /// Open the SQLite store in `data_dir`, falling back to memory.
    pub async fn open(data_dir: &Path) -> Self {
        match DatabasePool::open_in(data_dir).await {
            Ok(pool) => {
                info!(path = %data_dir.display(), "Conversation database opened");
                Self::Sqlite(SqliteMessageStore::new(pool))
            }
            Err(e) => {
                warn!(error = %e, "Failed to open conversation database, history will not be persisted");
                Self::Memory(InMemoryMessageStore::new())
            }
        }
    }

    pub fn is_durable(&self) -> bool {
        matches!(self, Self::Sqlite(_))
    }
}

impl MessageStore for ConversationStore {
    async fn load(&self) -> Result<Vec<Message>, RepositoryError> {
        match self {
            Self::Sqlite(store) => store.load().await,
            Self::Memory(store) => store.load().await,
        }
    }

    async fn save(&self, messages: &[Message]) -> Result<(), RepositoryError> {
        match self {
            Self::Sqlite(store) => store.save(messages).await,
            Self::Memory(store) => store.save(messages).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_opens_sqlite_in_data_dir() {
        let dir = tempfile::tempdir().unwrap();

        let store = ConversationStore::open(dir.path()).await;

        assert!(store.is_durable());
        store.save(&[Message::user("Hello")]).await.unwrap();
        assert_eq!(store.load().await.unwrap(), vec![Message::user("Hello")]);
    }

    #[tokio::test]
    async fn test_falls_back_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the data directory should be.
        let blocked = dir.path().join("not-a-dir");
        std::fs::write(&blocked, "x").unwrap();

        let store = ConversationStore::open(&blocked).await;

        assert!(!store.is_durable());
        store.save(&[Message::user("kept")]).await.unwrap();
        assert_eq!(store.load().await.unwrap(), vec![Message::user("kept")]);
    }
}
