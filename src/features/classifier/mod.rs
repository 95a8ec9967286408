//! # Feature: Message Classifier
//!
//! Maps raw message text to an [`Intent`]. Pure: no Discord, no network.
//!
//! Precedence:
//! 1. `create ...` (case-sensitive, no prefix needed) short-circuits everything
//! 2. messages that neither mention the bot nor start with the prefix are ignored;
//!    a mention is a `<@id>` token or, via [`classify_mentioned`], gateway metadata
//! 3. the mention token or the prefix is stripped (prefix wins when both apply)
//! 4. a leading `say` (any case) selects [`Intent::Say`]
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

pub const CREATE_KEYWORD: &str = "create";
pub const EMPTY_PAYLOAD: &str = "(nothing)";
const SAY_KEYWORD: &str = "say";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    CreateResource(String),
    Say(String),
    MentionOrCommand(String),
    Noop,
}

impl Intent {
    /// Text to answer in character, for the intents that get a persona reply
    pub fn reply_text(&self) -> Option<&str> {
        match self {
            Intent::Say(text) | Intent::MentionOrCommand(text) => Some(text),
            Intent::CreateResource(_) | Intent::Noop => None,
        }
    }
}

/// Any user mention token, `<@id>` or the legacy nickname form `<@!id>`
fn mention_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<@!?(\d+)>").ok()).as_ref()
}

/// Byte range of the first mention token addressed to `bot_id`
fn find_mention(content: &str, bot_id: &str) -> Option<Range<usize>> {
    if bot_id.is_empty() {
        return None;
    }
    mention_pattern()?
        .captures_iter(content)
        .find(|caps| caps.get(1).is_some_and(|id| id.as_str() == bot_id))
        .and_then(|caps| caps.get(0))
        .map(|m| m.range())
}

/// Classify text alone: the bot counts as mentioned only through a
/// `<@id>` token in the content.
pub fn classify(content: &str, bot_id: &str, prefix: &str) -> Intent {
    classify_mentioned(content, false, bot_id, prefix)
}

/// Classify with mention metadata from the gateway.
///
/// `mentioned` covers what the text does not show: replies to the bot with
/// ping enabled and `@everyone`/`@here`. The first mention token is still
/// stripped when present.
pub fn classify_mentioned(content: &str, mentioned: bool, bot_id: &str, prefix: &str) -> Intent {
    let content = content.trim();

    if let Some(rest) = content.strip_prefix(CREATE_KEYWORD) {
        let payload = rest.trim();
        let payload = if payload.is_empty() { EMPTY_PAYLOAD } else { payload };
        return Intent::CreateResource(payload.to_string());
    }

    let token = find_mention(content, bot_id);
    // An empty prefix would turn every message into a command
    let is_command = !prefix.is_empty() && content.starts_with(prefix);

    let stripped = if is_command {
        content[prefix.len()..].trim().to_string()
    } else if let Some(range) = token {
        let mut without = String::with_capacity(content.len());
        without.push_str(&content[..range.start]);
        without.push_str(&content[range.end..]);
        without.trim().to_string()
    } else if mentioned {
        content.to_string()
    } else {
        return Intent::Noop;
    };

    match stripped.get(..SAY_KEYWORD.len()) {
        Some(head) if head.eq_ignore_ascii_case(SAY_KEYWORD) => {
            Intent::Say(stripped[SAY_KEYWORD.len()..].trim().to_string())
        }
        _ => Intent::MentionOrCommand(stripped),
    }
}
