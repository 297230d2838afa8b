//! SQLite conversation store.
//!
//! Implements `MessageStore` from `lumina-core`. A save replaces the whole
//! table inside one transaction, so a failed or interrupted save leaves the
//! previously committed conversation intact.

use chrono::Utc;
use lumina_core::chat::repository::MessageStore;
use lumina_types::chat::{Message, MessageRole};
use lumina_types::error::RepositoryError;
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `MessageStore`.
#[derive(Clone)]
pub struct SqliteMessageStore {
    pool: DatabasePool,
}

impl SqliteMessageStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct MessageRow {
    role: String,
    content: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            role: row.try_get("role")?,
            content: row.try_get("content")?,
        })
    }

    fn into_message(self) -> Result<Message, RepositoryError> {
        let role = self
            .role
            .parse::<MessageRole>()
            .map_err(RepositoryError::Query)?;
        Ok(Message {
            role,
            content: self.content,
        })
    }
}

/// Pool and I/O failures mean the database is unreachable; everything else
/// is a failed statement.
fn map_sqlx_error(err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::Connection
        }
        other => RepositoryError::Query(other.to_string()),
    }
}

impl MessageStore for SqliteMessageStore {
    async fn load(&self) -> Result<Vec<Message>, RepositoryError> {
        let rows = sqlx::query("SELECT role, content FROM messages ORDER BY id ASC")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter()
            .map(|row| {
                MessageRow::from_row(row)
                    .map_err(map_sqlx_error)?
                    .into_message()
            })
            .collect()
    }

    async fn save(&self, messages: &[Message]) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(map_sqlx_error)?;

        sqlx::query("DELETE FROM messages")
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        let created_at = Utc::now().to_rfc3339();
        for message in messages {
            sqlx::query("INSERT INTO messages (role, content, created_at) VALUES (?, ?, ?)")
                .bind(message.role.to_string())
                .bind(&message.content)
                .bind(&created_at)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        }

        // Dropping `tx` without commit rolls back.
        tx.commit()
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }
}
