//! Chat session engine.
//!
//! A `ChatSession` owns one conversation log and is its only writer. Each turn
//! runs: validate -> (optional) fresh codebase context -> record the user
//! message and save -> generate -> record the assistant message and save.
//!
//! Failure policy per turn:
//! - empty input or a context failure leaves the log untouched;
//! - a generation failure keeps the already-recorded user message;
//! - save failures are logged and otherwise ignored.

use std::future::Future;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use lumina_types::chat::{ChatState, Message, MessageLog};
use lumina_types::error::{ChatError, ContextError, TurnFailure};
use lumina_types::llm::LlmError;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::context::box_provider::BoxContextProvider;
use crate::llm::generator::ResponseGenerator;

use super::prompt::build_context_prompt;
use super::repository::MessageStore;

/// Validation message for an empty turn.
pub const EMPTY_MESSAGE: &str = "message cannot be empty";

/// Per-call deadlines for the slow collaborators. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionConfig {
    pub context_timeout: Option<Duration>,
    pub generation_timeout: Option<Duration>,
}

/// Orchestrates one conversation.
///
/// Turns are serialized: `send_message` holds a turn lock for its whole body,
/// both saves included, so concurrent callers never interleave log mutations
/// or persistence writes. The log itself is behind a separate short-lived
/// lock, so [`ChatSession::get_state`] never waits on a collaborator.
pub struct ChatSession<G: ResponseGenerator, S: MessageStore> {
    generator: G,
    context: Option<BoxContextProvider>,
    store: S,
    config: SessionConfig,
    log: RwLock<MessageLog>,
    turn: Mutex<()>,
}

impl<G: ResponseGenerator, S: MessageStore> ChatSession<G, S> {
    /// Create a session, hydrating the log from `store`.
    ///
    /// A failed load is not fatal: it is logged and the session starts empty.
    pub async fn new(
        generator: G,
        context: Option<BoxContextProvider>,
        store: S,
        config: SessionConfig,
    ) -> Self {
        let log = match store.load().await {
            Ok(messages) => {
                info!(messages = messages.len(), "Conversation restored");
                MessageLog::from(messages)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load conversation history, starting empty");
                MessageLog::new()
            }
        };

        Self {
            generator,
            context,
            store,
            config,
            log: RwLock::new(log),
            turn: Mutex::new(()),
        }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn context_provider(&self) -> Option<&BoxContextProvider> {
        self.context.as_ref()
    }

    /// Copy of the current conversation. Never fails.
    pub fn get_state(&self) -> ChatState {
        self.log
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot()
    }

    /// Run one turn without an external cancellation signal.
    pub async fn send_message(&self, text: &str) -> Result<ChatState, TurnFailure> {
        self.send_message_with_cancel(text, &CancellationToken::new())
            .await
    }

    /// Run one turn. Cancelling `cancel` aborts whichever collaborator call is
    /// in flight; the turn then fails exactly as if that call had failed.
    pub async fn send_message_with_cancel(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<ChatState, TurnFailure> {
        if text.is_empty() {
            return Err(self.failure(ChatError::Validation(EMPTY_MESSAGE.to_string())));
        }

        let _turn = self.turn.lock().await;
        debug!(chars = text.len(), "Turn started");

        let prompt = match &self.context {
            Some(provider) => {
                let context = bounded(
                    provider.generate_output(),
                    self.config.context_timeout,
                    cancel,
                    ContextError::TimedOut,
                    || ContextError::Cancelled,
                )
                .await
                .map_err(|e| {
                    warn!(provider = provider.name(), error = %e, "Context generation failed, turn not recorded");
                    self.failure(ChatError::ContextGeneration(e))
                })?;

                debug!(provider = provider.name(), bytes = context.len(), "Codebase context generated");
                build_context_prompt(&context, text)
            }
            None => text.to_string(),
        };

        let recorded = self.append(Message::user(text));
        self.persist(&recorded).await;

        let response = match bounded(
            self.generator.send_message(&prompt),
            self.config.generation_timeout,
            cancel,
            LlmError::Timeout,
            || LlmError::Cancelled,
        )
        .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    generator = self.generator.name(),
                    error = %e,
                    "Generation failed, user message kept"
                );
                return Err(self.failure(ChatError::Generation(e)));
            }
        };

        let completed = self.append(Message::assistant(response));
        self.persist(&completed).await;

        debug!(messages = completed.len(), "Turn completed");
        Ok(completed)
    }

    fn append(&self, message: Message) -> ChatState {
        let mut log = self.log.write().unwrap_or_else(PoisonError::into_inner);
        log.push(message);
        log.snapshot()
    }

    fn failure(&self, error: ChatError) -> TurnFailure {
        TurnFailure {
            state: self.get_state(),
            error,
        }
    }

    /// Best-effort full-log save. Errors never reach the caller.
    async fn persist(&self, state: &ChatState) {
        match self.store.save(&state.messages).await {
            Ok(()) => debug!(messages = state.len(), "Conversation saved"),
            Err(e) => warn!(
                error = %e,
                messages = state.len(),
                "Failed to persist conversation"
            ),
        }
    }
}

/// Await `call`, giving up after `deadline` or when `cancel` fires.
async fn bounded<T, E>(
    call: impl Future<Output = Result<T, E>>,
    deadline: Option<Duration>,
    cancel: &CancellationToken,
    on_timeout: impl FnOnce(Duration) -> E,
    on_cancel: impl FnOnce() -> E,
) -> Result<T, E> {
    let timed = async {
        match deadline {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(on_timeout(limit)),
            },
            None => call.await,
        }
    };

    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(on_cancel()),
        result = timed => result,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex as StdMutex};

    use lumina_types::chat::MessageRole;
    use lumina_types::error::RepositoryError;
    use tokio::sync::Notify;

    use super::*;
    use crate::chat::memory_store::InMemoryMessageStore;
    use crate::context::provider::ContextProvider;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Generator that replays scripted results and records every prompt.
    #[derive(Clone, Default)]
    struct MockGenerator {
        script: Arc<StdMutex<VecDeque<Result<String, LlmError>>>>,
        prompts: Arc<StdMutex<Vec<String>>>,
        delay: Option<Duration>,
    }

    impl MockGenerator {
        fn replying(responses: &[&str]) -> Self {
            let generator = Self::default();
            for r in responses {
                generator.push(Ok(r.to_string()));
            }
            generator
        }

        fn failing(message: &str) -> Self {
            let generator = Self::default();
            generator.push(Err(LlmError::Provider {
                message: message.to_string(),
            }));
            generator
        }

        fn push(&self, result: Result<String, LlmError>) {
            self.script.lock().unwrap().push_back(result);
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    impl ResponseGenerator for MockGenerator {
        fn name(&self) -> &str {
            "mock"
        }

        fn model(&self) -> &str {
            "mock-model"
        }

        async fn send_message(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(format!("re: {prompt}")))
        }
    }

    /// Context provider whose output can be changed between turns.
    #[derive(Clone)]
    struct MockContext {
        output: Arc<StdMutex<Result<String, ContextError>>>,
        calls: Arc<StdMutex<u32>>,
        delay: Option<Duration>,
    }

    impl MockContext {
        fn ok(output: &str) -> Self {
            Self {
                output: Arc::new(StdMutex::new(Ok(output.to_string()))),
                calls: Arc::new(StdMutex::new(0)),
                delay: None,
            }
        }

        fn failing(message: &str) -> Self {
            let ctx = Self::ok("");
            ctx.set(Err(ContextError::Failed(message.to_string())));
            ctx
        }

        fn set(&self, output: Result<String, ContextError>) {
            *self.output.lock().unwrap() = output;
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    impl ContextProvider for MockContext {
        fn name(&self) -> &str {
            "mock-context"
        }

        async fn generate_output(&self) -> Result<String, ContextError> {
            *self.calls.lock().unwrap() += 1;
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.output.lock().unwrap().clone()
        }
    }

    /// Store that records every save and can be told to fail.
    #[derive(Clone, Default)]
    struct RecordingStore {
        saved: Arc<StdMutex<Vec<Message>>>,
        save_calls: Arc<StdMutex<Vec<Vec<Message>>>>,
        fail_load: bool,
        fail_save: bool,
    }

    impl RecordingStore {
        fn save_calls(&self) -> Vec<Vec<Message>> {
            self.save_calls.lock().unwrap().clone()
        }
    }

    impl MessageStore for RecordingStore {
        async fn load(&self) -> Result<Vec<Message>, RepositoryError> {
            if self.fail_load {
                return Err(RepositoryError::Query("corrupted data".to_string()));
            }
            Ok(self.saved.lock().unwrap().clone())
        }

        async fn save(&self, messages: &[Message]) -> Result<(), RepositoryError> {
            self.save_calls.lock().unwrap().push(messages.to_vec());
            if self.fail_save {
                return Err(RepositoryError::Query("disk full".to_string()));
            }
            *self.saved.lock().unwrap() = messages.to_vec();
            Ok(())
        }
    }

    async fn session<S: MessageStore>(
        generator: MockGenerator,
        context: Option<MockContext>,
        store: S,
    ) -> ChatSession<MockGenerator, S> {
        ChatSession::new(
            generator,
            context.map(BoxContextProvider::new),
            store,
            SessionConfig::default(),
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Turn outcomes
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_success_without_context() {
        let chat = session(MockGenerator::replying(&["Hi"]), None, InMemoryMessageStore::new()).await;

        let state = chat.send_message("Hello").await.unwrap();

        assert_eq!(
            state.messages,
            vec![Message::user("Hello"), Message::assistant("Hi")]
        );
        assert_eq!(chat.generator().prompts(), vec!["Hello".to_string()]);
    }

    #[tokio::test]
    async fn test_context_failure_is_non_mutating() {
        let generator = MockGenerator::replying(&["unused"]);
        let store = RecordingStore::default();
        let chat = session(generator.clone(), Some(MockContext::failing("boom")), store.clone()).await;

        let failure = chat.send_message("Q").await.unwrap_err();

        assert!(failure.state.is_empty());
        assert_eq!(failure.error.to_string(), "failed to generate codebase context: boom");
        assert!(matches!(failure.error, ChatError::ContextGeneration(_)));
        assert!(chat.get_state().is_empty());
        assert!(generator.prompts().is_empty(), "generator must not be called");
        assert!(store.save_calls().is_empty(), "nothing must be saved");
    }

    #[tokio::test]
    async fn test_context_failure_keeps_prior_log() {
        let context = MockContext::ok("ctx");
        let chat = session(MockGenerator::replying(&["A1"]), Some(context.clone()), InMemoryMessageStore::new()).await;
        chat.send_message("Q1").await.unwrap();
        let before = chat.get_state();

        context.set(Err(ContextError::Failed("repomix failed".to_string())));
        let failure = chat.send_message("Q2").await.unwrap_err();

        assert_eq!(failure.state, before);
        assert_eq!(chat.get_state(), before);
    }

    #[tokio::test]
    async fn test_generation_failure_keeps_user_message() {
        let chat = session(MockGenerator::failing("API down"), None, InMemoryMessageStore::new()).await;

        let failure = chat.send_message("Q").await.unwrap_err();

        assert_eq!(failure.state.messages, vec![Message::user("Q")]);
        assert_eq!(
            failure.error,
            ChatError::Generation(LlmError::Provider {
                message: "API down".to_string()
            })
        );
        assert_eq!(chat.get_state().messages, vec![Message::user("Q")]);
    }

    #[tokio::test]
    async fn test_empty_message_rejected_without_side_effects() {
        let generator = MockGenerator::replying(&["Response 1"]);
        let context = MockContext::ok("ctx");
        let store = RecordingStore::default();
        let chat = session(generator.clone(), Some(context.clone()), store.clone()).await;
        chat.send_message("Message 1").await.unwrap();
        let saves_before = store.save_calls().len();
        let before = chat.get_state();

        let failure = chat.send_message("").await.unwrap_err();

        assert_eq!(failure.error, ChatError::Validation(EMPTY_MESSAGE.to_string()));
        assert_eq!(failure.error.to_string(), "message cannot be empty");
        assert_eq!(failure.state, before);
        assert_eq!(context.calls(), 1);
        assert_eq!(generator.prompts().len(), 1);
        assert_eq!(store.save_calls().len(), saves_before);
    }

    #[tokio::test]
    async fn test_multiple_turns_keep_order() {
        let chat = session(
            MockGenerator::replying(&["Response 1", "Response 2"]),
            None,
            InMemoryMessageStore::new(),
        )
        .await;

        let first = chat.send_message("Message 1").await.unwrap();
        assert_eq!(first.len(), 2);
        let second = chat.send_message("Message 2").await.unwrap();

        let contents: Vec<&str> = second.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["Message 1", "Response 1", "Message 2", "Response 2"]);
        let roles: Vec<MessageRole> = second.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![MessageRole::User, MessageRole::Assistant, MessageRole::User, MessageRole::Assistant]
        );
    }

    // -----------------------------------------------------------------------
    // Context augmentation
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_prompt_wraps_context_but_log_keeps_raw_text() {
        let generator = MockGenerator::replying(&["OK"]);
        let context = MockContext::ok("<codebase>test content</codebase>");
        let chat = session(generator.clone(), Some(context), InMemoryMessageStore::new()).await;

        let state = chat.send_message("My question").await.unwrap();

        assert_eq!(
            generator.prompts(),
            vec![build_context_prompt("<codebase>test content</codebase>", "My question")]
        );
        assert_eq!(state.messages[0], Message::user("My question"));
    }

    #[tokio::test]
    async fn test_context_regenerated_every_turn() {
        let generator = MockGenerator::replying(&["Response", "Response"]);
        let context = MockContext::ok("output-1");
        let chat = session(generator.clone(), Some(context.clone()), InMemoryMessageStore::new()).await;

        chat.send_message("First").await.unwrap();
        context.set(Ok("output-2".to_string()));
        chat.send_message("Second").await.unwrap();

        let prompts = generator.prompts();
        assert!(prompts[0].contains("output-1"));
        assert!(prompts[1].contains("output-2"));
        assert!(!prompts[1].contains("output-1"));
        assert_eq!(context.calls(), 2);
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_saves_after_user_and_after_assistant() {
        let store = RecordingStore::default();
        let chat = session(MockGenerator::replying(&["AI response"]), None, store.clone()).await;

        chat.send_message("User question").await.unwrap();

        let calls = store.save_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], vec![Message::user("User question")]);
        assert_eq!(
            calls[1],
            vec![Message::user("User question"), Message::assistant("AI response")]
        );
    }

    #[tokio::test]
    async fn test_generation_failure_saves_user_message_once() {
        let store = RecordingStore::default();
        let chat = session(MockGenerator::failing("API down"), None, store.clone()).await;

        chat.send_message("Q").await.unwrap_err();

        assert_eq!(store.save_calls(), vec![vec![Message::user("Q")]]);
    }

    #[tokio::test]
    async fn test_save_failure_is_transparent() {
        let failing = RecordingStore {
            fail_save: true,
            ..Default::default()
        };
        let healthy = RecordingStore::default();

        let a = session(MockGenerator::replying(&["AI response"]), None, failing.clone()).await;
        let b = session(MockGenerator::replying(&["AI response"]), None, healthy).await;

        let from_failing = a.send_message("User question").await;
        let from_healthy = b.send_message("User question").await;

        assert_eq!(from_failing, from_healthy);
        assert_eq!(failing.save_calls().len(), 2, "both saves still attempted");
    }

    #[tokio::test]
    async fn test_save_failure_does_not_change_generation_error() {
        let failing = RecordingStore {
            fail_save: true,
            ..Default::default()
        };
        let chat = session(MockGenerator::failing("API down"), None, failing).await;

        let failure = chat.send_message("Q").await.unwrap_err();

        assert!(matches!(failure.error, ChatError::Generation(LlmError::Provider { .. })));
        assert_eq!(failure.state.messages, vec![Message::user("Q")]);
    }

    #[tokio::test]
    async fn test_hydrates_from_store() {
        let existing = vec![
            Message::user("Previous question"),
            Message::assistant("Previous answer"),
        ];
        let store = InMemoryMessageStore::with_messages(existing.clone());

        let chat = session(MockGenerator::default(), None, store).await;

        assert_eq!(chat.get_state().messages, existing);
    }

    #[tokio::test]
    async fn test_load_failure_starts_empty() {
        let store = RecordingStore {
            fail_load: true,
            ..Default::default()
        };

        let chat = session(MockGenerator::replying(&["Hi"]), None, store).await;

        assert!(chat.get_state().is_empty());
        let state = chat.send_message("Hello").await.unwrap();
        assert_eq!(state.len(), 2);
    }

    #[tokio::test]
    async fn test_round_trip_through_shared_store() {
        let store = InMemoryMessageStore::new();
        let first = session(
            MockGenerator::replying(&["Response 1", "Response 2"]),
            None,
            store.clone(),
        )
        .await;
        first.send_message("Message 1").await.unwrap();
        first.send_message("Message 2").await.unwrap();
        let final_state = first.get_state();
        drop(first);

        let second = session(MockGenerator::default(), None, store).await;

        assert_eq!(second.get_state(), final_state);
    }

    // -----------------------------------------------------------------------
    // Snapshots, deadlines, cancellation, serialization
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_snapshot_mutation_does_not_leak() {
        let chat = session(MockGenerator::replying(&["Hi"]), None, InMemoryMessageStore::new()).await;
        let mut state = chat.send_message("Hello").await.unwrap();

        state.messages.clear();

        assert_eq!(chat.get_state().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_context_timeout_is_non_mutating() {
        let mut context = MockContext::ok("slow");
        context.delay = Some(Duration::from_secs(600));
        let generator = MockGenerator::replying(&["unused"]);
        let chat = ChatSession::new(
            generator.clone(),
            Some(BoxContextProvider::new(context)),
            InMemoryMessageStore::new(),
            SessionConfig {
                context_timeout: Some(Duration::from_secs(5)),
                generation_timeout: None,
            },
        )
        .await;

        let failure = chat.send_message("Q").await.unwrap_err();

        assert_eq!(
            failure.error,
            ChatError::ContextGeneration(ContextError::TimedOut(Duration::from_secs(5)))
        );
        assert!(chat.get_state().is_empty());
        assert!(generator.prompts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_generation_timeout_keeps_user_message() {
        let mut generator = MockGenerator::replying(&["late"]);
        generator.delay = Some(Duration::from_secs(600));
        let chat = ChatSession::new(
            generator,
            None,
            InMemoryMessageStore::new(),
            SessionConfig {
                context_timeout: None,
                generation_timeout: Some(Duration::from_secs(30)),
            },
        )
        .await;

        let failure = chat.send_message("Q").await.unwrap_err();

        assert_eq!(
            failure.error,
            ChatError::Generation(LlmError::Timeout(Duration::from_secs(30)))
        );
        assert_eq!(chat.get_state().messages, vec![Message::user("Q")]);
    }

    #[tokio::test]
    async fn test_cancelled_before_context_records_nothing() {
        let chat = session(
            MockGenerator::replying(&["unused"]),
            Some(MockContext::ok("ctx")),
            InMemoryMessageStore::new(),
        )
        .await;
        let cancel = CancellationToken::new();
        cancel.cancel();

        let failure = chat.send_message_with_cancel("Q", &cancel).await.unwrap_err();

        assert_eq!(failure.error, ChatError::ContextGeneration(ContextError::Cancelled));
        assert!(chat.get_state().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_without_context_keeps_user_message() {
        let chat = session(MockGenerator::replying(&["unused"]), None, InMemoryMessageStore::new()).await;
        let cancel = CancellationToken::new();
        cancel.cancel();

        let failure = chat.send_message_with_cancel("Q", &cancel).await.unwrap_err();

        assert_eq!(failure.error, ChatError::Generation(LlmError::Cancelled));
        assert_eq!(chat.get_state().messages, vec![Message::user("Q")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_turns_do_not_interleave() {
        let mut generator = MockGenerator::default();
        generator.delay = Some(Duration::from_millis(100));
        let store = RecordingStore::default();
        let chat = session(generator, None, store.clone()).await;

        let (a, b) = tokio::join!(chat.send_message("one"), chat.send_message("two"));
        a.unwrap();
        b.unwrap();

        let messages = chat.get_state().messages;
        assert_eq!(messages.len(), 4);
        for pair in messages.chunks(2) {
            assert_eq!(pair[0].role, MessageRole::User);
            assert_eq!(pair[1].role, MessageRole::Assistant);
            assert_eq!(pair[1].content, format!("re: {}", pair[0].content));
        }

        // Every save saw a log consistent with a serial execution.
        let sizes: Vec<usize> = store.save_calls().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![1, 2, 3, 4]);
    }

    /// Generator that parks until released, signalling when it is entered.
    struct GatedGenerator {
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    impl ResponseGenerator for GatedGenerator {
        fn name(&self) -> &str {
            "gated"
        }

        fn model(&self) -> &str {
            "gated-model"
        }

        async fn send_message(&self, _prompt: &str) -> Result<String, LlmError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok("done".to_string())
        }
    }

    #[tokio::test]
    async fn test_get_state_does_not_wait_for_generation() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let chat = Arc::new(
            ChatSession::new(
                GatedGenerator {
                    entered: entered.clone(),
                    release: release.clone(),
                },
                None,
                InMemoryMessageStore::new(),
                SessionConfig::default(),
            )
            .await,
        );

        let turn = tokio::spawn({
            let chat = chat.clone();
            async move { chat.send_message("Q").await }
        });

        entered.notified().await;
        assert_eq!(chat.get_state().messages, vec![Message::user("Q")]);

        release.notify_one();
        let state = turn.await.unwrap().unwrap();
        assert_eq!(state.messages, vec![Message::user("Q"), Message::assistant("done")]);
    }
}
