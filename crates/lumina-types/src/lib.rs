//! Shared domain types for Lumina.
//!
//! This crate contains the core domain types used across the Lumina workspace:
//! chat messages and snapshots, generation/context errors, and the global
//! configuration shape.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
