//! ResponseGenerator trait definition.
//!
//! This is the core abstraction that all generation backends implement.
//! Uses RPITIT for `send_message`, matching the other ports in this crate.

use lumina_types::llm::LlmError;

/// Trait for text-generation backends (OpenAI-compatible APIs, test doubles).
///
/// Any transport, authentication, or quota failure is surfaced as a single
/// [`LlmError`]. The session applies deadlines and cancellation around the
/// call; implementations do not need their own.
pub trait ResponseGenerator: Send + Sync {
    /// Human-readable backend name (e.g., "openai").
    fn name(&self) -> &str;

    /// Model identifier requests are sent to.
    fn model(&self) -> &str;

    /// Send a prompt and receive the full generated response.
    fn send_message(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<String, LlmError>> + Send;
}
