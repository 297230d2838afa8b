//! OpenTelemetry GenAI Semantic Convention attribute names.
//!
//! Generation spans are declared with these names as literal field names
//! (tracing macros require literals); the constants are used when recording
//! values onto an existing span.
//!
//! Span naming convention: `"{operation} {model}"` (e.g., `"chat gpt-4.1"`).

/// The unique response ID from the provider.
pub const GEN_AI_RESPONSE_ID: &str = "gen_ai.response.id";

/// The number of input tokens consumed.
pub const GEN_AI_USAGE_INPUT_TOKENS: &str = "gen_ai.usage.input_tokens";

/// The number of output tokens generated.
pub const GEN_AI_USAGE_OUTPUT_TOKENS: &str = "gen_ai.usage.output_tokens";

/// Standard chat completion operation.
pub const OP_CHAT: &str = "chat";

/// OTel span name for `operation` against `model`.
pub fn span_name(operation: &str, model: &str) -> String {
    format!("{operation} {model}")
}
