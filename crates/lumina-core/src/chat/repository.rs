//! MessageStore trait definition.
//!
//! Durable storage for a whole conversation. Follows the same RPITIT pattern
//! as the other ports in this crate.

use lumina_types::chat::Message;
use lumina_types::error::RepositoryError;

/// Repository trait for conversation persistence.
///
/// Implementations live in lumina-infra (e.g., `SqliteMessageStore`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait MessageStore: Send + Sync {
    /// Load the entire persisted conversation in original insertion order.
    fn load(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Message>, RepositoryError>> + Send;

    /// Replace the entire persisted conversation with `messages`.
    ///
    /// Must be all-or-nothing: on error (or crash mid-write) the store holds
    /// either the previous complete log or the new complete log.
    fn save(
        &self,
        messages: &[Message],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
