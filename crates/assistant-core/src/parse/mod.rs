//! Recovery of the strict reply triple from model output.
//!
//! The model is asked to answer with exactly one JSON object
//! `{"reply": "...", "steps": [...], "tips": [...]}` but nothing enforces it.
//! Parsing runs an ordered list of strategies and the first one producing a
//! valid reply wins:
//!
//! 1. the whole text as JSON,
//! 2. the span between the first `{` and the last `}`, strict and then
//!    relaxed (see [`relax_json`]),
//!
//! and when none of them succeeds the raw text itself becomes the reply.

mod repair;

pub use repair::relax_json;

use serde_json::Value;

use crate::error::SchemaError;
use crate::message::BotReply;
use crate::normalize::string_list;

/// Upper bound, in characters, for a plain-text fallback reply.
pub const MAX_FALLBACK_CHARS: usize = 1500;

/// Outcome of the structured parsing strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReply {
    Ok(BotReply),
    Malformed(String),
}

impl ParsedReply {
    pub fn is_malformed(&self) -> bool {
        matches!(self, ParsedReply::Malformed(_))
    }

    /// Resolve to the strict triple, falling back to plain text.
    pub fn into_reply(self) -> BotReply {
        match self {
            ParsedReply::Ok(reply) => reply,
            ParsedReply::Malformed(raw) => fallback_reply(&raw),
        }
    }
}

type Strategy = fn(&str) -> Option<BotReply>;

const STRATEGIES: &[(&str, Strategy)] = &[("direct", parse_direct), ("embedded", parse_embedded)];

/// Run the structured strategies in order.
pub fn try_parse(raw: &str) -> ParsedReply {
    for (name, strategy) in STRATEGIES {
        if let Some(reply) = strategy(raw) {
            log::debug!("Model output parsed with '{}' strategy", name);
            return ParsedReply::Ok(reply);
        }
    }
    ParsedReply::Malformed(raw.to_string())
}

/// Parse model output into the strict triple. Never fails.
pub fn parse_bot_reply(raw: &str) -> BotReply {
    let parsed = try_parse(raw);
    if parsed.is_malformed() && !raw.trim().is_empty() {
        log::warn!(
            "Model output is not valid reply JSON, using plain text ({} chars)",
            raw.len()
        );
    }
    parsed.into_reply()
}

/// Check a decoded value against the reply schema and coerce it.
///
/// `steps` and `tips` entries are stringified; anything other than an array
/// becomes an empty list. `reply` is trimmed.
pub fn validate_bot_json(value: &Value) -> Result<BotReply, SchemaError> {
    let obj = value.as_object().ok_or(SchemaError::NotAnObject)?;
    let reply = obj
        .get("reply")
        .and_then(Value::as_str)
        .ok_or(SchemaError::MissingReply)?;

    Ok(BotReply {
        reply: reply.trim().to_string(),
        steps: string_list(obj.get("steps")),
        tips: string_list(obj.get("tips")),
    })
}

/// Span from the first `{` to the last `}`, if the braces are in order.
pub fn extract_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

fn fallback_reply(raw: &str) -> BotReply {
    BotReply::text_only(raw.trim().chars().take(MAX_FALLBACK_CHARS).collect::<String>())
}

fn parse_direct(raw: &str) -> Option<BotReply> {
    let value = serde_json::from_str::<Value>(raw).ok()?;
    validated(&value)
}

fn parse_embedded(raw: &str) -> Option<BotReply> {
    let candidate = extract_object_span(raw)?;
    let value = match serde_json::from_str::<Value>(candidate) {
        Ok(value) => value,
        Err(_) => serde_json::from_str::<Value>(&relax_json(candidate)).ok()?,
    };
    validated(&value)
}

fn validated(value: &Value) -> Option<BotReply> {
    match validate_bot_json(value) {
        Ok(reply) => Some(reply),
        Err(err) => {
            log::debug!("Rejected model JSON: {}", err);
            None
        }
    }
}
