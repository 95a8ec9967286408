//! # Provider Feature
//!
//! Remote generative-text replies with bounded retry and rule-based fallback.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: true (enabled by GEMINI_API_KEY)

pub mod backend;
pub mod error;
pub mod gemini;
pub mod manager;
pub mod retry;
pub mod session;

pub use backend::ChatBackend;
pub use error::ProviderError;
pub use gemini::GeminiBackend;
pub use manager::SessionManager;
pub use retry::{ErrorClass, RetryPolicy, Sleeper, TokioSleeper};
pub use session::{ConversationSession, ConversationTurn, GenerationConfig, SessionMode, TurnRole};
