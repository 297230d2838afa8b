//! Chat-session engine and collaborator trait definitions for Lumina.
//!
//! This crate defines the "ports" (context provider, response generator,
//! message store) that the infrastructure layer implements, plus the
//! [`chat::session::ChatSession`] that orchestrates them. It depends only on
//! `lumina-types` -- never on `lumina-infra` or any database/IO crate.

pub mod chat;
pub mod context;
pub mod llm;
