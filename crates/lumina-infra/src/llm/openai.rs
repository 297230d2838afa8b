//! OpenAI-compatible response generator.
//!
//! Sends each prompt as a single user message to a chat completions endpoint
//! via [`async_openai`]. No conversation history is forwarded: the prompt
//! carries everything the model sees.

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
};
use async_openai::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::{Instrument, Span, debug, info_span};

use lumina_core::llm::generator::ResponseGenerator;
use lumina_observe::genai_attrs::{
    GEN_AI_RESPONSE_ID, GEN_AI_USAGE_INPUT_TOKENS, GEN_AI_USAGE_OUTPUT_TOKENS, OP_CHAT, span_name,
};
use lumina_types::config::GeneratorConfig;
use lumina_types::llm::LlmError;

/// Error message when the backend answers with no choices.
pub const NO_RESPONSE: &str = "no response from OpenAI";

/// Generator for any OpenAI-compatible chat completions API.
///
/// Does NOT derive Debug: the `async_openai::Client` holds the API key.
pub struct OpenAiGenerator {
    client: Client<OpenAIConfig>,
    provider_name: String,
    model: String,
    has_key: bool,
}

impl OpenAiGenerator {
    /// Build a generator from configuration and an (optional) API key.
    ///
    /// A missing key is not an error here; every call then fails with
    /// [`LlmError::AuthenticationFailed`] without touching the network.
    pub fn new(config: &GeneratorConfig, api_key: Option<SecretString>) -> Self {
        let mut openai_config = OpenAIConfig::new().with_api_base(&config.base_url);
        let has_key = match &api_key {
            Some(key) if !key.expose_secret().is_empty() => {
                openai_config = openai_config.with_api_key(key.expose_secret());
                true
            }
            _ => false,
        };

        Self {
            client: Client::with_config(openai_config),
            provider_name: config.provider_name.clone(),
            model: config.model.clone(),
            has_key,
        }
    }

    fn build_request(&self, prompt: &str) -> CreateChatCompletionRequest {
        CreateChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessage {
                    content: ChatCompletionRequestUserMessageContent::Text(prompt.to_string()),
                    name: None,
                },
            )],
            ..Default::default()
        }
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        if !self.has_key {
            return Err(LlmError::AuthenticationFailed);
        }

        let response = self
            .client
            .chat()
            .create(self.build_request(prompt))
            .await
            .map_err(map_openai_error)?;

        let span = Span::current();
        span.record(GEN_AI_RESPONSE_ID, response.id.as_str());
        if let Some(usage) = &response.usage {
            span.record(GEN_AI_USAGE_INPUT_TOKENS, usage.prompt_tokens);
            span.record(GEN_AI_USAGE_OUTPUT_TOKENS, usage.completion_tokens);
        }

        let choice = response.choices.first().ok_or_else(|| LlmError::Provider {
            message: NO_RESPONSE.to_string(),
        })?;
        let content = choice.message.content.clone().unwrap_or_default();

        debug!(chars = content.len(), "Completion received");
        Ok(content)
    }
}

impl ResponseGenerator for OpenAiGenerator {
    fn name(&self) -> &str {
        &self.provider_name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn send_message(&self, prompt: &str) -> Result<String, LlmError> {
        let span = info_span!(
            "gen_ai.chat",
            otel.name = %span_name(OP_CHAT, &self.model),
            gen_ai.operation.name = OP_CHAT,
            gen_ai.provider.name = %self.provider_name,
            gen_ai.request.model = %self.model,
            gen_ai.response.id = tracing::field::Empty,
            gen_ai.usage.input_tokens = tracing::field::Empty,
            gen_ai.usage.output_tokens = tracing::field::Empty,
        );

        self.complete(prompt).instrument(span).await
    }
}

/// Map an `async_openai::error::OpenAIError` to an [`LlmError`].
fn map_openai_error(err: async_openai::error::OpenAIError) -> LlmError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "invalid_api_key"
                || error_type == "authentication_error"
                || api_err.message.contains("Incorrect API key")
            {
                LlmError::AuthenticationFailed
            } else if code == "rate_limit_exceeded" || error_type == "rate_limit_error" {
                LlmError::RateLimited {
                    retry_after_ms: None,
                }
            } else if code == "context_length_exceeded"
                || api_err.message.contains("maximum context length")
            {
                LlmError::ContextLengthExceeded {
                    max: 0,
                    requested: 0,
                }
            } else if code == "server_error" || error_type == "overloaded_error" {
                LlmError::Overloaded(api_err.message.clone())
            } else {
                LlmError::Provider {
                    message: err.to_string(),
                }
            }
        }
        OpenAIError::Reqwest(reqwest_err) => match reqwest_err.status().map(|s| s.as_u16()) {
            Some(401) => LlmError::AuthenticationFailed,
            Some(429) => LlmError::RateLimited {
                retry_after_ms: None,
            },
            Some(503) | Some(529) => LlmError::Overloaded(err.to_string()),
            _ => LlmError::Provider {
                message: err.to_string(),
            },
        },
        OpenAIError::JSONDeserialize(_, content) => {
            LlmError::Deserialization(format!("failed to parse response: {content}"))
        }
        OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg.clone()),
        _ => LlmError::Provider {
            message: err.to_string(),
        },
    }
}
