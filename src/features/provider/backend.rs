use async_trait::async_trait;

use super::error::ProviderError;
use super::session::{ConversationTurn, GenerationConfig};

/// A remote generative-text service that continues a conversation
///
/// Implementations are stateless: the caller owns the history and records the
/// exchange once `send_message` succeeds.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Send `message` as the next user turn after `history` and return the model's reply
    async fn send_message(
        &self,
        history: &[ConversationTurn],
        message: &str,
        generation: &GenerationConfig,
    ) -> Result<String, ProviderError>;
}
