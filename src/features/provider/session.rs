//! Conversation history kept for the provider
//!
//! ## Ordering
//! Turns are appended only after an exchange succeeds, user turn first, so a
//! failed request leaves no trace. In [`SessionMode::Shared`] the order of
//! exchanges is the order in which provider calls complete, and unrelated
//! channels can see each other's turns.
//!
//! ## Growth
//! Every request resends the whole history. A history limit evicts the
//! oldest exchanges so a busy channel stays within the model's context;
//! the bootstrap pair is always kept.

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::features::personas::Persona;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        ConversationTurn {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        ConversationTurn {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            max_output_tokens: 8000,
            temperature: 0.7,
        }
    }
}

/// Turns seeded by [`ConversationSession::bootstrap`], never evicted
const BOOTSTRAP_TURNS: usize = 2;

#[derive(Debug, Clone)]
pub struct ConversationSession {
    turns: Vec<ConversationTurn>,
    generation: GenerationConfig,
    max_exchanges: Option<usize>,
}

impl ConversationSession {
    /// New session seeded with the persona instruction and its acknowledgment
    pub fn bootstrap(persona: &Persona, generation: GenerationConfig) -> Self {
        ConversationSession {
            turns: vec![
                ConversationTurn::user(persona.bootstrap_prompt()),
                ConversationTurn::model(persona.acknowledgment),
            ],
            generation,
            max_exchanges: None,
        }
    }

    /// Keep at most `max_exchanges` user/model pairs after the bootstrap
    /// turns, dropping the oldest first. `None` keeps everything.
    pub fn with_history_limit(mut self, max_exchanges: Option<usize>) -> Self {
        self.max_exchanges = max_exchanges;
        self.evict();
        self
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn generation(&self) -> &GenerationConfig {
        &self.generation
    }

    /// Record a completed exchange
    pub fn record_exchange(&mut self, message: &str, reply: &str) {
        self.turns.push(ConversationTurn::user(message));
        self.turns.push(ConversationTurn::model(reply));
        self.evict();
    }

    fn evict(&mut self) {
        let Some(max) = self.max_exchanges else {
            return;
        };
        let keep = BOOTSTRAP_TURNS + max * 2;
        if self.turns.len() > keep {
            let excess = self.turns.len() - keep;
            self.turns.drain(BOOTSTRAP_TURNS..BOOTSTRAP_TURNS + excess);
        }
    }
}

/// How provider conversations are partitioned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionMode {
    /// One session per channel, exchanges within a channel serialized
    #[default]
    PerScope,
    /// One session for the whole process, no serialization
    Shared,
}

impl FromStr for SessionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "per_scope" | "per-scope" | "scope" => Ok(SessionMode::PerScope),
            "shared" => Ok(SessionMode::Shared),
            other => Err(anyhow!(
                "Unknown SESSION_MODE '{other}' (expected 'per_scope' or 'shared')"
            )),
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionMode::PerScope => write!(f, "per_scope"),
            SessionMode::Shared => write!(f, "shared"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::personas::MECHAMARU;

    #[test]
    fn test_bootstrap_turns() {
        let session = ConversationSession::bootstrap(&MECHAMARU, GenerationConfig::default());
        let turns = session.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, TurnRole::User);
        assert!(turns[0].text.contains("Mechamaru from Jujutsu Kaisen"));
        assert_eq!(turns[1].role, TurnRole::Model);
        assert_eq!(turns[1].text, MECHAMARU.acknowledgment);
        assert_eq!(session.generation().max_output_tokens, 8000);
    }

    #[test]
    fn test_record_exchange_appends_in_order() {
        let mut session = ConversationSession::bootstrap(&MECHAMARU, GenerationConfig::default());
        session.record_exchange("yuji: hi", " Hmph. ");
        let turns = session.turns();
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[2], ConversationTurn::user("yuji: hi"));
        assert_eq!(turns[3], ConversationTurn::model(" Hmph. "));
    }

    #[test]
    fn test_history_limit_drops_oldest_exchange() {
        let mut session = ConversationSession::bootstrap(&MECHAMARU, GenerationConfig::default())
            .with_history_limit(Some(2));
        for n in 1..=5 {
            session.record_exchange(&format!("q{n}"), &format!("a{n}"));
        }

        let turns = session.turns();
        assert_eq!(turns.len(), 6);
        assert_eq!(turns[1].text, MECHAMARU.acknowledgment);
        assert_eq!(turns[2], ConversationTurn::user("q4"));
        assert_eq!(turns[5], ConversationTurn::model("a5"));
    }

    #[test]
    fn test_zero_limit_keeps_only_bootstrap() {
        let mut session = ConversationSession::bootstrap(&MECHAMARU, GenerationConfig::default())
            .with_history_limit(Some(0));
        session.record_exchange("q", "a");
        assert_eq!(session.turns().len(), 2);
    }

    #[test]
    fn test_session_mode_parse() {
        assert_eq!("shared".parse::<SessionMode>().unwrap(), SessionMode::Shared);
        assert_eq!("PER_SCOPE".parse::<SessionMode>().unwrap(), SessionMode::PerScope);
        assert!("channel".parse::<SessionMode>().is_err());
        assert_eq!(SessionMode::default().to_string(), "per_scope");
    }
}
