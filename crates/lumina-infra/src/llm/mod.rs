//! Response generator implementations.
//!
//! Concrete implementations of the [`ResponseGenerator`] trait defined in
//! `lumina-core`.
//!
//! [`ResponseGenerator`]: lumina_core::llm::generator::ResponseGenerator

pub mod openai;
