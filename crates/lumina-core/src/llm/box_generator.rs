//! BoxResponseGenerator -- object-safe dynamic dispatch wrapper for ResponseGenerator.
//!
//! Same blanket-impl pattern as `BoxContextProvider`:
//! 1. Define an object-safe `ResponseGeneratorDyn` trait with boxed futures
//! 2. Blanket-impl `ResponseGeneratorDyn` for all `T: ResponseGenerator`
//! 3. `BoxResponseGenerator` wraps `Box<dyn ResponseGeneratorDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use lumina_types::llm::LlmError;

use super::generator::ResponseGenerator;

/// Object-safe version of [`ResponseGenerator`] with boxed futures.
pub trait ResponseGeneratorDyn: Send + Sync {
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    fn send_message_boxed<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>>;
}

impl<T: ResponseGenerator> ResponseGeneratorDyn for T {
    fn name(&self) -> &str {
        ResponseGenerator::name(self)
    }

    fn model(&self) -> &str {
        ResponseGenerator::model(self)
    }

    fn send_message_boxed<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>> {
        Box::pin(self.send_message(prompt))
    }
}

/// Type-erased generator for runtime backend selection.
///
/// Implements [`ResponseGenerator`] itself, so a session can be built over
/// `BoxResponseGenerator` and handed any backend (or a test double) at runtime.
pub struct BoxResponseGenerator {
    inner: Box<dyn ResponseGeneratorDyn + Send + Sync>,
}

impl BoxResponseGenerator {
    /// Wrap a concrete `ResponseGenerator` in a type-erased box.
    pub fn new<T: ResponseGenerator + 'static>(generator: T) -> Self {
        Self {
            inner: Box::new(generator),
        }
    }
}

impl ResponseGenerator for BoxResponseGenerator {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn send_message(&self, prompt: &str) -> Result<String, LlmError> {
        self.inner.send_message_boxed(prompt).await
    }
}
