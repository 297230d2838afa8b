//! Outbound prompt construction.
//!
//! The context blob is opaque: it is embedded verbatim, never parsed.

/// Wrap a user question with a freshly generated description of the codebase.
pub fn build_context_prompt(context: &str, question: &str) -> String {
    format!(
        "Here is the current state of the codebase:\n\n{context}\n\nUser question: {question}"
    )
}
