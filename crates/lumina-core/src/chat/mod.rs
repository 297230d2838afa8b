//! Chat session engine and message persistence abstractions.
//!
//! - [`session::ChatSession`]: the single writer of a conversation log.
//! - [`repository::MessageStore`]: full-snapshot load/replace durability.
//! - [`prompt`]: the codebase-context prompt template.

pub mod memory_store;
pub mod prompt;
pub mod repository;
pub mod session;
