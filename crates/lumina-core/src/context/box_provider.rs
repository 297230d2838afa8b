//! BoxContextProvider -- object-safe dynamic dispatch wrapper for ContextProvider.
//!
//! Follows the blanket-impl pattern:
//! 1. Define an object-safe `ContextProviderDyn` trait with boxed futures
//! 2. Blanket-impl `ContextProviderDyn` for all `T: ContextProvider`
//! 3. `BoxContextProvider` wraps `Box<dyn ContextProviderDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use lumina_types::error::ContextError;

use super::provider::ContextProvider;

/// Object-safe version of [`ContextProvider`] with boxed futures.
///
/// This trait exists solely to enable dynamic dispatch (`dyn ContextProviderDyn`).
/// A blanket implementation is provided for all types implementing `ContextProvider`.
pub trait ContextProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn generate_output_boxed<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<String, ContextError>> + Send + 'a>>;
}

impl<T: ContextProvider> ContextProviderDyn for T {
    fn name(&self) -> &str {
        ContextProvider::name(self)
    }

    fn generate_output_boxed<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<String, ContextError>> + Send + 'a>> {
        Box::pin(self.generate_output())
    }
}

/// Type-erased context provider.
///
/// Since `ContextProvider` uses RPITIT, it cannot be used as a trait object
/// directly. `BoxContextProvider` provides equivalent methods that delegate
/// to the inner `ContextProviderDyn` trait object.
pub struct BoxContextProvider {
    inner: Box<dyn ContextProviderDyn + Send + Sync>,
}

impl BoxContextProvider {
    /// Wrap a concrete `ContextProvider` in a type-erased box.
    pub fn new<T: ContextProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Generate fresh context.
    pub async fn generate_output(&self) -> Result<String, ContextError> {
        self.inner.generate_output_boxed().await
    }
}
