//! Application state wiring the chat session together.
//!
//! AppState holds the single chat session used by both CLI commands and REST
//! API handlers. The session is generic over generator and store; AppState
//! pins it to the concrete infra implementations.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use lumina_core::chat::session::{ChatSession, SessionConfig};
use lumina_core::context::box_provider::BoxContextProvider;
use lumina_core::llm::box_generator::BoxResponseGenerator;
use lumina_infra::config::{api_key_from_env, load_config};
use lumina_infra::context::repomix::RepomixContextProvider;
use lumina_infra::filesystem::{ensure_data_dir, resolve_data_dir};
use lumina_infra::llm::openai::OpenAiGenerator;
use lumina_infra::store::ConversationStore;

/// The session type pinned to infra implementations.
pub type ConcreteChatSession = ChatSession<BoxResponseGenerator, ConversationStore>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<ConcreteChatSession>,
    /// Cancelled on server shutdown; aborts in-flight turns.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Initialize the application state: load config, open storage, wire the session.
    ///
    /// Never fails on a missing API key or an unusable database; both degrade
    /// with a warning.
    pub async fn init(no_context: bool) -> Self {
        let data_dir = resolve_data_dir();
        if let Err(e) = ensure_data_dir(&data_dir).await {
            warn!(path = %data_dir.display(), error = %e, "Failed to create data directory");
        }

        let config = load_config(&data_dir).await;
        let store = ConversationStore::open(&data_dir).await;

        let api_key = api_key_from_env(&config.generator.api_key_env);
        let generator =
            BoxResponseGenerator::new(OpenAiGenerator::new(&config.generator, api_key));

        let context = if config.context.enabled && !no_context {
            Some(BoxContextProvider::new(RepomixContextProvider::new(
                &config.context,
            )))
        } else {
            info!("Codebase context disabled");
            None
        };

        let session_config = SessionConfig {
            context_timeout: config.context.timeout(),
            generation_timeout: config.generator.timeout(),
        };
        let session = ChatSession::new(generator, context, store, session_config).await;

        Self::new(session)
    }

    /// Assemble state around an already-built session.
    pub fn new(session: ConcreteChatSession) -> Self {
        Self {
            session: Arc::new(session),
            shutdown: CancellationToken::new(),
        }
    }
}
