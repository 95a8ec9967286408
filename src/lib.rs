// Core layer - configuration and shared Discord utilities
pub mod core;

// Features layer - classifier, persona generator, provider sessions, dispatch
pub mod features;

// Application layer - slash commands
pub mod commands;

pub use core::Config;

pub use features::{
    classify, classify_mentioned, ChatBackend, Dispatcher, GeminiBackend, Intent, Persona,
    ProviderError, RandomSource, ReplyGenerator, RetryPolicy, SessionManager, SessionMode, MECHAMARU,
};

pub use commands::{fixed_reply, CommandRegistry};
