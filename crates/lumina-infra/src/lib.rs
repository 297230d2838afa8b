//! Infrastructure layer for Lumina.
//!
//! Contains implementations of the ports defined in `lumina-core`: the SQLite
//! conversation store, the OpenAI-compatible generator, and the repomix
//! context provider. Also loads configuration and resolves the data directory.

pub mod config;
pub mod context;
pub mod filesystem;
pub mod llm;
pub mod sqlite;
pub mod store;
