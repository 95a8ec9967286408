//! # Feature: Provider Session Manager
//!
//! Produces persona replies through a [`ChatBackend`] when one is configured,
//! retrying overloaded calls and falling back to the rule-based generator on
//! any other failure. `request_reply` never returns an error.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Lazy sessions (per-scope or shared), 503 retry loop, generator fallback

use dashmap::DashMap;
use log::{debug, error, info, warn};
use std::sync::{Arc, OnceLock};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::backend::ChatBackend;
use super::error::ProviderError;
use super::retry::{RetryPolicy, Sleeper, TokioSleeper};
use super::session::{ConversationSession, ConversationTurn, GenerationConfig, SessionMode};
use crate::features::personas::ReplyGenerator;

type SessionHandle = Arc<Mutex<ConversationSession>>;

/// Access to one session for the duration of a request
enum SessionAccess {
    /// Held for the whole request, retries included
    Exclusive(OwnedMutexGuard<ConversationSession>),
    /// Locked only to snapshot history and to record the result
    Unserialized(SessionHandle),
}

impl SessionAccess {
    async fn exchange(
        &mut self,
        backend: &dyn ChatBackend,
        message: &str,
    ) -> Result<String, ProviderError> {
        match self {
            SessionAccess::Exclusive(session) => {
                let reply = backend
                    .send_message(session.turns(), message, session.generation())
                    .await?;
                session.record_exchange(message, &reply);
                Ok(reply)
            }
            SessionAccess::Unserialized(handle) => {
                let snapshot = handle.lock().await.clone();
                let reply = backend
                    .send_message(snapshot.turns(), message, snapshot.generation())
                    .await?;
                handle.lock().await.record_exchange(message, &reply);
                Ok(reply)
            }
        }
    }
}

pub struct SessionManager {
    backend: Option<Arc<dyn ChatBackend>>,
    generator: Arc<ReplyGenerator>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    mode: SessionMode,
    generation: GenerationConfig,
    history_limit: Option<usize>,
    scoped: DashMap<String, SessionHandle>,
    shared: OnceLock<SessionHandle>,
}

impl SessionManager {
    /// Manager without a backend: every reply comes from the generator
    pub fn new(generator: Arc<ReplyGenerator>) -> Self {
        SessionManager {
            backend: None,
            generator,
            policy: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
            mode: SessionMode::default(),
            generation: GenerationConfig::default(),
            history_limit: None,
            scoped: DashMap::new(),
            shared: OnceLock::new(),
        }
    }

    pub fn with_backend(mut self, backend: Arc<dyn ChatBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_mode(mut self, mode: SessionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    /// Cap each session at `max_exchanges` remembered exchanges
    pub fn with_history_limit(mut self, max_exchanges: Option<usize>) -> Self {
        self.history_limit = max_exchanges;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn generator(&self) -> &ReplyGenerator {
        &self.generator
    }

    /// Number of provider sessions created so far
    pub fn session_count(&self) -> usize {
        match self.mode {
            SessionMode::PerScope => self.scoped.len(),
            SessionMode::Shared => usize::from(self.shared.get().is_some()),
        }
    }

    /// Copy of the history that `scope_id` would continue, if it exists yet
    pub async fn history(&self, scope_id: &str) -> Option<Vec<ConversationTurn>> {
        let handle = match self.mode {
            SessionMode::PerScope => self.scoped.get(scope_id).map(|h| Arc::clone(h.value())),
            SessionMode::Shared => self.shared.get().cloned(),
        }?;
        let session = handle.lock().await;
        Some(session.turns().to_vec())
    }

    fn new_session(&self) -> SessionHandle {
        Arc::new(Mutex::new(
            ConversationSession::bootstrap(self.generator.persona(), self.generation.clone())
                .with_history_limit(self.history_limit),
        ))
    }

    async fn session_for(&self, scope_id: &str) -> SessionAccess {
        match self.mode {
            SessionMode::PerScope => {
                let handle = self
                    .scoped
                    .entry(scope_id.to_string())
                    .or_insert_with(|| {
                        info!("🧵 Starting provider session for scope {scope_id}");
                        self.new_session()
                    })
                    .clone();
                SessionAccess::Exclusive(handle.lock_owned().await)
            }
            SessionMode::Shared => {
                let handle = self.shared.get_or_init(|| {
                    info!("🧵 Starting shared provider session");
                    self.new_session()
                });
                SessionAccess::Unserialized(Arc::clone(handle))
            }
        }
    }

    /// Reply to `text` from `username` in `scope_id`. Always yields a usable string.
    pub async fn request_reply(&self, scope_id: &str, text: &str, username: &str) -> String {
        let Some(backend) = self.backend.as_deref() else {
            return self.generator.generate(text);
        };

        let mut session = self.session_for(scope_id).await;
        let message = format!("{username}: {text}");
        let mut retries_left = self.policy.max_retries;

        loop {
            match session.exchange(backend, &message).await {
                Ok(reply) => {
                    debug!("{} replied with {} chars in scope {scope_id}", backend.name(), reply.len());
                    return reply.trim().to_string();
                }
                Err(err) if self.policy.is_retryable(&err) && retries_left > 0 => {
                    warn!(
                        "⏳ Model overloaded. Retrying in {:?}... ({retries_left} attempts left)",
                        self.policy.delay
                    );
                    self.sleeper.sleep(self.policy.delay).await;
                    retries_left -= 1;
                }
                Err(err) => {
                    error!("❌ {} reply failed for scope {scope_id}: {err}", backend.name());
                    return self.generator.generate(text);
                }
            }
        }
    }
}
