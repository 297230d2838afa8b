//! ContextProvider trait definition.

use lumina_types::error::ContextError;

/// Produces a textual description of the current state of the codebase.
///
/// Every call must reflect the underlying source as it is *now*;
/// implementations must not cache output across calls. Calls may be slow
/// (e.g., they shell out), so the session bounds them with a deadline and a
/// cancellation token. Implementations should release any child resources
/// when their future is dropped.
///
/// Implementations live in lumina-infra (e.g., `RepomixContextProvider`).
pub trait ContextProvider: Send + Sync {
    /// Human-readable provider name (e.g., "repomix").
    fn name(&self) -> &str;

    /// Generate fresh context. The output is opaque text.
    fn generate_output(
        &self,
    ) -> impl std::future::Future<Output = Result<String, ContextError>> + Send;
}
