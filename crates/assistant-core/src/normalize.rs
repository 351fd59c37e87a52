//! Canonical chat message shape.
//!
//! Messages reach the assistant from two places: the in-memory conversation
//! (typed [`ChatMessage`]s) and loosely shaped JSON payloads such as stored
//! transcripts or freshly decoded model output. Both paths end in the same
//! normalized form, where `text` always carries what should be displayed and
//! sent back to the model as history.

use serde_json::{Map, Value};

use crate::message::{ChatMessage, Sender};

/// Normalize a loosely shaped JSON message.
///
/// Returns `None` for `null` and for anything that is not a JSON object.
pub fn normalize(value: &Value) -> Option<ChatMessage> {
    let obj = value.as_object()?;

    let text = obj.get("text").filter(|v| is_truthy(v));
    let sender = obj.get("sender").filter(|v| is_truthy(v));

    if let (Some(text), Some(sender)) = (text, sender) {
        return Some(copy_message(obj, text, sender));
    }

    if obj.get("sender").and_then(Value::as_str) == Some("user") {
        let text = obj
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Some(ChatMessage::user(text));
    }

    let reply = match obj.get("reply") {
        Some(v) if !v.is_null() => coerce_to_string(v),
        _ => text.map(coerce_to_string).unwrap_or_default(),
    };
    let steps = string_list(obj.get("steps"));
    let tips = string_list(obj.get("tips"));
    let raw = obj
        .get("raw")
        .filter(|v| !v.is_null())
        .cloned()
        .unwrap_or_else(|| value.clone());

    Some(ChatMessage {
        sender: Sender::Bot,
        text: compose_text(&reply, &steps, &tips),
        reply: Some(reply),
        steps,
        tips,
        raw: Some(raw),
    })
}

impl ChatMessage {
    /// Normalize a typed message. Idempotent: a message that already has
    /// display text is returned as an unchanged copy.
    pub fn normalized(&self) -> ChatMessage {
        if !self.text.is_empty() || self.is_user() {
            return self.clone();
        }

        let reply = self.reply.clone().unwrap_or_default();
        let raw = self
            .raw
            .clone()
            .or_else(|| serde_json::to_value(self).ok());

        ChatMessage {
            sender: Sender::Bot,
            text: compose_text(&reply, &self.steps, &self.tips),
            reply: Some(reply),
            steps: self.steps.clone(),
            tips: self.tips.clone(),
            raw,
        }
    }
}

/// Join reply, steps and tips into the display text, separated by blank lines.
pub fn compose_text(reply: &str, steps: &[String], tips: &[String]) -> String {
    let mut parts = Vec::with_capacity(3);
    if !reply.is_empty() {
        parts.push(reply.to_string());
    }
    if !steps.is_empty() {
        parts.push(format!("Steps:\n{}", enumerate(steps)));
    }
    if !tips.is_empty() {
        parts.push(format!("Tips:\n{}", enumerate(tips)));
    }
    parts.join("\n\n")
}

fn enumerate(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// String form of a JSON value. Strings are taken verbatim, everything else
/// uses its compact JSON rendering.
pub fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Entries of a JSON array coerced to strings; anything else is empty.
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().map(coerce_to_string).collect(),
        _ => Vec::new(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn copy_message(obj: &Map<String, Value>, text: &Value, sender: &Value) -> ChatMessage {
    let sender = sender.as_str().map(Sender::from_wire).unwrap_or(Sender::Bot);
    let reply = match obj.get("reply") {
        Some(v) if !v.is_null() => Some(coerce_to_string(v)),
        _ => None,
    };
    let raw = obj.get("raw").filter(|v| !v.is_null()).cloned();

    ChatMessage {
        sender,
        text: coerce_to_string(text),
        reply,
        steps: string_list(obj.get("steps")),
        tips: string_list(obj.get("tips")),
        raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::BotReply;
    use serde_json::json;

    #[test]
    fn null_and_non_objects_are_rejected() {
        assert!(normalize(&Value::Null).is_none());
        assert!(normalize(&json!("hello")).is_none());
        assert!(normalize(&json!(42)).is_none());
    }

    #[test]
    fn already_normalized_message_is_copied() {
        let value = json!({"sender": "user", "text": "hi"});
        let msg = normalize(&value).unwrap();
        assert_eq!(msg, ChatMessage::user("hi"));
    }

    #[test]
    fn user_text_is_coerced_to_string() {
        let msg = normalize(&json!({"sender": "user"})).unwrap();
        assert_eq!(msg.text, "");
        assert_eq!(msg.sender, Sender::User);

        let msg = normalize(&json!({"sender": "user", "text": 12})).unwrap();
        assert_eq!(msg.text, "12");

        let msg = normalize(&json!({"sender": "user", "text": 0})).unwrap();
        assert_eq!(msg.text, "");
    }

    #[test]
    fn bot_payload_builds_composite_text() {
        let value = json!({
            "sender": "bot",
            "reply": "Admit the patient from the receptionist dashboard.",
            "steps": ["Open Patients", "Click Admit"],
            "tips": ["Check free beds first"]
        });
        let msg = normalize(&value).unwrap();

        assert_eq!(
            msg.text,
            "Admit the patient from the receptionist dashboard.\n\n\
             Steps:\n1. Open Patients\n2. Click Admit\n\n\
             Tips:\n1. Check free beds first"
        );
        assert_eq!(msg.raw, Some(value));
        assert_eq!(msg.steps.len(), 2);
    }

    #[test]
    fn bot_reply_defaults_to_text_when_missing() {
        let msg = normalize(&json!({"text": "plain answer"})).unwrap();
        assert_eq!(msg.sender, Sender::Bot);
        assert_eq!(msg.reply.as_deref(), Some("plain answer"));
        assert_eq!(msg.text, "plain answer");
    }

    #[test]
    fn bot_non_array_steps_default_to_empty() {
        let msg = normalize(&json!({"sender": "bot", "reply": "ok", "steps": "nope", "tips": null}))
            .unwrap();
        assert!(msg.steps.is_empty());
        assert!(msg.tips.is_empty());
        assert_eq!(msg.text, "ok");
    }

    #[test]
    fn typed_normalization_is_idempotent() {
        let samples = vec![
            ChatMessage::user("hello"),
            ChatMessage::user(""),
            ChatMessage::bot(BotReply::new("a", vec!["b".into()], vec!["c".into()])),
            ChatMessage::bot(BotReply::default()),
            ChatMessage {
                sender: Sender::Bot,
                text: String::new(),
                reply: None,
                steps: vec!["only steps".into()],
                tips: vec![],
                raw: None,
            },
        ];

        for msg in samples {
            let once = msg.normalized();
            let twice = once.normalized();
            assert_eq!(once, twice, "normalization changed {msg:?}");
        }
    }

    #[test]
    fn json_normalization_is_idempotent_through_serde() {
        let value = json!({"sender": "bot", "reply": "hello", "steps": [], "tips": []});
        let once = normalize(&value).unwrap();
        let again = normalize(&serde_json::to_value(&once).unwrap()).unwrap();
        assert_eq!(once, again);
    }

    #[test]
    fn empty_bot_reply_round_trips_without_nesting_raw() {
        let value = json!({"sender": "bot", "reply": "", "steps": [], "tips": []});
        let once = normalize(&value).unwrap();
        let again = normalize(&serde_json::to_value(&once).unwrap()).unwrap();
        assert_eq!(once, again);
        assert_eq!(again.raw, Some(value));
    }

    #[test]
    fn existing_raw_payload_is_kept() {
        let value = json!({"sender": "bot", "reply": "", "raw": {"orig": 1}});
        let msg = normalize(&value).unwrap();
        assert_eq!(msg.raw, Some(json!({"orig": 1})));
    }
}
