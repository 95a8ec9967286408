//! Bounded retry for overloaded providers
//!
//! Only "503 Service Unavailable" is treated as transient. Everything else
//! goes straight to the rule-based fallback.

use async_trait::async_trait;
use std::time::Duration;

use super::error::ProviderError;

pub const OVERLOADED_STATUS: u16 = 503;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Expected to clear up on its own; worth retrying
    Transient,
    Fatal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt, so a request makes at most `max_retries + 1` calls
    pub max_retries: u32,
    /// Fixed wait before each retry
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            delay: Duration::from_millis(2000),
        }
    }
}

impl RetryPolicy {
    pub fn classify(&self, err: &ProviderError) -> ErrorClass {
        if err.status() == Some(OVERLOADED_STATUS)
            || err.message().contains(&OVERLOADED_STATUS.to_string())
        {
            ErrorClass::Transient
        } else {
            ErrorClass::Fatal
        }
    }

    pub fn is_retryable(&self, err: &ProviderError) -> bool {
        self.classify(err) == ErrorClass::Transient
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

/// Delay primitive used between retries
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
