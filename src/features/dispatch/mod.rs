//! # Feature: Dispatch
//!
//! Turns one inbound chat message into an optional reply: classify, then
//! answer directly, through the provider, or through the generator.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

use anyhow::Result;
use log::{debug, info};
use std::sync::Arc;

use crate::core::Config;
use crate::features::classifier::{classify_mentioned, Intent};
use crate::features::personas::{ReplyGenerator, MECHAMARU};
use crate::features::provider::{GeminiBackend, SessionManager};

pub struct Dispatcher {
    sessions: Arc<SessionManager>,
    prefix: String,
}

impl Dispatcher {
    pub fn new(sessions: Arc<SessionManager>, prefix: impl Into<String>) -> Self {
        Dispatcher {
            sessions,
            prefix: prefix.into(),
        }
    }

    /// Wire the Mechamaru persona to Gemini when an API key is configured
    pub fn from_config(config: &Config) -> Result<Self> {
        let generator = Arc::new(ReplyGenerator::new(&MECHAMARU));
        let mut sessions = SessionManager::new(generator)
            .with_policy(config.retry_policy.clone())
            .with_mode(config.session_mode)
            .with_generation(config.generation.clone())
            .with_history_limit(config.history_limit);

        match &config.gemini_api_key {
            Some(key) => {
                let backend = GeminiBackend::new(
                    key,
                    &config.gemini_model,
                    &config.gemini_base_url,
                    config.gemini_timeout,
                )?;
                sessions = sessions.with_backend(Arc::new(backend));
                info!(
                    "🧠 Gemini replies enabled (model: {}, sessions: {})",
                    config.gemini_model,
                    sessions.mode()
                );
            }
            None => info!("📜 GEMINI_API_KEY not set - using rule-based replies only"),
        }

        Ok(Dispatcher::new(Arc::new(sessions), config.command_prefix.clone()))
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Classify one inbound message. Own messages are always [`Intent::Noop`].
    ///
    /// `mentioned` carries gateway mention metadata (reply pings, `@everyone`).
    pub fn classify(
        &self,
        raw_content: &str,
        author_id: &str,
        bot_id: &str,
        mentioned: bool,
    ) -> Intent {
        if author_id == bot_id {
            return Intent::Noop;
        }
        classify_mentioned(raw_content, mentioned, bot_id, &self.prefix)
    }

    /// Whether answering `intent` goes through the provider
    pub fn calls_provider(&self, intent: &Intent) -> bool {
        self.sessions.is_configured() && intent.reply_text().is_some()
    }

    /// Reply for an already classified message, or `None` to stay silent
    pub async fn respond(&self, scope_id: &str, intent: Intent, username: &str) -> Option<String> {
        debug!("Classified message in {scope_id} as {intent:?}");

        match intent {
            Intent::CreateResource(payload) => Some(format!("Short URL created: {payload}")),
            Intent::Noop => None,
            Intent::Say(text) | Intent::MentionOrCommand(text) => {
                if self.sessions.is_configured() {
                    Some(self.sessions.request_reply(scope_id, &text, username).await)
                } else {
                    Some(self.sessions.generator().generate(&text))
                }
            }
        }
    }

    /// Reply for one message judged by its text alone
    pub async fn handle(
        &self,
        scope_id: &str,
        raw_content: &str,
        author_id: &str,
        username: &str,
        bot_id: &str,
    ) -> Option<String> {
        let intent = self.classify(raw_content, author_id, bot_id, false);
        self.respond(scope_id, intent, username).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::personas::SeededRandom;
    use crate::features::provider::{
        ChatBackend, ConversationTurn, GenerationConfig, ProviderError,
    };
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const BOT: &str = "42";

    struct EchoBackend {
        messages: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatBackend for EchoBackend {
        fn name(&self) -> &str {
            "echo"
        }

        async fn send_message(
            &self,
            _history: &[ConversationTurn],
            message: &str,
            _generation: &GenerationConfig,
        ) -> Result<String, ProviderError> {
            self.messages.lock().unwrap().push(message.to_string());
            Ok(format!(" echo({message}) "))
        }
    }

    fn rule_based() -> Dispatcher {
        let generator = Arc::new(ReplyGenerator::with_random(
            &MECHAMARU,
            Box::new(SeededRandom::new(3)),
        ));
        Dispatcher::new(Arc::new(SessionManager::new(generator)), "!")
    }

    fn provider_backed() -> (Dispatcher, Arc<EchoBackend>) {
        let backend = Arc::new(EchoBackend {
            messages: Mutex::new(Vec::new()),
        });
        let generator = Arc::new(ReplyGenerator::new(&MECHAMARU));
        let sessions = SessionManager::new(generator).with_backend(backend.clone());
        (Dispatcher::new(Arc::new(sessions), "!"), backend)
    }

    #[tokio::test]
    async fn test_create_short_url() {
        let dispatcher = rule_based();
        assert_eq!(
            dispatcher.handle("chan", "create https://x.co", "7", "yuji", BOT).await,
            Some("Short URL created: https://x.co".to_string())
        );
        assert_eq!(
            dispatcher.handle("chan", "  create  ", "7", "yuji", BOT).await,
            Some("Short URL created: (nothing)".to_string())
        );
    }

    #[tokio::test]
    async fn test_create_bypasses_provider() {
        let (dispatcher, backend) = provider_backed();
        let reply = dispatcher.handle("chan", "create abc", "7", "yuji", BOT).await;
        assert_eq!(reply.as_deref(), Some("Short URL created: abc"));
        assert!(backend.messages.lock().unwrap().is_empty());
        assert_eq!(dispatcher.sessions().session_count(), 0);
    }

    #[tokio::test]
    async fn test_unaddressed_message_gets_no_reply() {
        let dispatcher = rule_based();
        assert_eq!(dispatcher.handle("chan", "just chatting, say", "7", "yuji", BOT).await, None);
    }

    #[tokio::test]
    async fn test_own_messages_are_ignored() {
        let dispatcher = rule_based();
        assert_eq!(dispatcher.handle("chan", "create x", BOT, "mechamaru", BOT).await, None);
    }

    #[tokio::test]
    async fn test_rule_based_say() {
        let dispatcher = rule_based();
        let reply = dispatcher.handle("chan", "!say guard the door", "7", "yuji", BOT).await.unwrap();
        assert!(reply.starts_with("Mechamaru: "));
        assert!(reply.contains("guard the door"));
        assert!(!reply.contains("say guard"));
    }

    #[tokio::test]
    async fn test_rule_based_mention() {
        let dispatcher = rule_based();
        let content = format!("<@{BOT}> where is the curse");
        let reply = dispatcher.handle("chan", &content, "7", "yuji", BOT).await.unwrap();
        assert!(reply.contains("where is the curse"));
    }

    #[tokio::test]
    async fn test_provider_receives_stripped_text_and_username() {
        let (dispatcher, backend) = provider_backed();

        let say = dispatcher.handle("chan", "!say hello", "7", "yuji", BOT).await;
        let mention = dispatcher
            .handle("chan", &format!("<@!{BOT}> status"), "8", "mai", BOT)
            .await;

        assert_eq!(say.as_deref(), Some("echo(yuji: hello)"));
        assert_eq!(mention.as_deref(), Some("echo(mai: status)"));
        assert_eq!(
            *backend.messages.lock().unwrap(),
            vec!["yuji: hello".to_string(), "mai: status".to_string()]
        );
    }

    #[test]
    fn test_calls_provider() {
        let (dispatcher, _) = provider_backed();
        let call = |raw: &str, author: &str| {
            dispatcher.calls_provider(&dispatcher.classify(raw, author, BOT, false))
        };
        assert!(call("!say hi", "7"));
        assert!(!call("create hi", "7"));
        assert!(!call("hi", "7"));
        assert!(!call("!say hi", BOT));

        let offline = rule_based();
        assert!(!offline.calls_provider(&offline.classify("!say hi", "7", BOT, false)));
    }

    #[tokio::test]
    async fn test_reply_to_bot_reaches_provider() {
        let (dispatcher, backend) = provider_backed();
        let intent = dispatcher.classify("open the gate", "7", BOT, true);
        assert!(dispatcher.calls_provider(&intent));

        let reply = dispatcher.respond("chan", intent, "yuji").await;
        assert_eq!(reply.as_deref(), Some("echo(yuji: open the gate)"));
        assert_eq!(*backend.messages.lock().unwrap(), vec!["yuji: open the gate".to_string()]);
    }

    #[tokio::test]
    async fn test_everyone_mention_gets_persona_reply() {
        let dispatcher = rule_based();
        assert_eq!(dispatcher.handle("chan", "@everyone say hi", "7", "yuji", BOT).await, None);

        let intent = dispatcher.classify("@everyone say hi", "7", BOT, true);
        let reply = dispatcher.respond("chan", intent, "yuji").await.unwrap();
        assert!(reply.starts_with("Mechamaru: "));
        assert!(reply.contains("@everyone say hi"));
    }

    #[test]
    fn test_own_mentioned_message_is_noop() {
        let dispatcher = rule_based();
        assert_eq!(dispatcher.classify("hello", BOT, BOT, true), Intent::Noop);
    }

    #[test]
    fn test_from_config_without_key_is_rule_based() {
        let env: HashMap<&str, &str> = [("BOT_TOKEN", "t"), ("COMMAND_PREFIX", "?")].into();
        let config = Config::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        let dispatcher = Dispatcher::from_config(&config).unwrap();
        assert!(!dispatcher.sessions().is_configured());
        assert_eq!(dispatcher.prefix(), "?");
    }

    #[test]
    fn test_from_config_with_key_enables_provider() {
        let env: HashMap<&str, &str> = [("BOT_TOKEN", "t"), ("GEMINI_API_KEY", "k")].into();
        let config = Config::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        let dispatcher = Dispatcher::from_config(&config).unwrap();
        assert!(dispatcher.sessions().is_configured());
    }
}
