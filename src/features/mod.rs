//! # Features Layer
//!
//! The reply orchestration engine, leaf-first: personas and classifier are
//! pure, provider owns conversation state, dispatch composes them.

pub mod classifier;
pub mod dispatch;
pub mod personas;
pub mod provider;

pub use classifier::{classify, classify_mentioned, Intent};
pub use dispatch::Dispatcher;
pub use personas::{Persona, RandomSource, ReplyGenerator, MECHAMARU};
pub use provider::{ChatBackend, GeminiBackend, ProviderError, RetryPolicy, SessionManager, SessionMode};
