//! Process configuration loaded from the environment
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Gemini provider, retry policy and session mode settings

use anyhow::{anyhow, Context as _, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::features::provider::{GenerationConfig, RetryPolicy, SessionMode};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_PREFIX: &str = "!";
pub const DEFAULT_MAX_HISTORY_EXCHANGES: usize = 50;

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub discord_guild_id: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub gemini_timeout: Duration,
    pub command_prefix: String,
    pub session_mode: SessionMode,
    pub retry_policy: RetryPolicy,
    pub generation: GenerationConfig,
    /// Remembered exchanges per session; `None` is unbounded
    pub history_limit: Option<usize>,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let discord_token = get("BOT_TOKEN").ok_or_else(|| {
            anyhow!("Missing BOT_TOKEN in environment. Add a `.env` with BOT_TOKEN=your_token")
        })?;

        let defaults = RetryPolicy::default();
        let retry_policy = RetryPolicy {
            max_retries: parse_or("PROVIDER_MAX_RETRIES", get("PROVIDER_MAX_RETRIES"), defaults.max_retries)?,
            delay: Duration::from_millis(parse_or(
                "PROVIDER_RETRY_DELAY_MS",
                get("PROVIDER_RETRY_DELAY_MS"),
                defaults.delay.as_millis() as u64,
            )?),
        };

        let generation_defaults = GenerationConfig::default();
        let generation = GenerationConfig {
            max_output_tokens: parse_or(
                "MAX_OUTPUT_TOKENS",
                get("MAX_OUTPUT_TOKENS"),
                generation_defaults.max_output_tokens,
            )?,
            temperature: parse_or("TEMPERATURE", get("TEMPERATURE"), generation_defaults.temperature)?,
        };

        let session_mode = match get("SESSION_MODE") {
            Some(raw) => raw.parse::<SessionMode>()?,
            None => SessionMode::default(),
        };

        // 0 disables the cap
        let history_limit = match parse_or(
            "MAX_HISTORY_EXCHANGES",
            get("MAX_HISTORY_EXCHANGES"),
            DEFAULT_MAX_HISTORY_EXCHANGES,
        )? {
            0 => None,
            max => Some(max),
        };

        Ok(Config {
            discord_token,
            discord_guild_id: get("DISCORD_GUILD_ID"),
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: get("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            gemini_timeout: Duration::from_secs(parse_or(
                "GEMINI_TIMEOUT_SECS",
                get("GEMINI_TIMEOUT_SECS"),
                60,
            )?),
            command_prefix: get("COMMAND_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            session_mode,
            retry_policy,
            generation,
            history_limit,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn provider_enabled(&self) -> bool {
        self.gemini_api_key.is_some()
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .parse::<T>()
            .with_context(|| format!("Invalid value for {key}: '{value}'")),
        None => Ok(default),
    }
}
