use serde::{Deserialize, Serialize};

use crate::message::ChatMessage;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Model => "model",
        }
    }
}

/// One role-tagged utterance in the history sent to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

/// Map a conversation onto model turns. Every message is normalized first so
/// bot messages contribute their composite display text.
pub fn build_turns(history: &[ChatMessage]) -> Vec<Turn> {
    history
        .iter()
        .map(ChatMessage::normalized)
        .map(|msg| {
            let role = if msg.is_user() {
                TurnRole::User
            } else {
                TurnRole::Model
            };
            Turn {
                role,
                text: msg.text,
            }
        })
        .collect()
}

/// Same as [`build_turns`] for loosely shaped JSON history; entries that fail
/// to normalize are dropped.
pub fn build_turns_from_values(history: &[serde_json::Value]) -> Vec<Turn> {
    let messages: Vec<ChatMessage> = history.iter().filter_map(crate::normalize).collect();
    build_turns(&messages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::BotReply;
    use serde_json::json;

    #[test]
    fn maps_user_and_bot_messages() {
        let history = vec![
            ChatMessage::user("hi"),
            ChatMessage {
                sender: crate::Sender::Bot,
                text: String::new(),
                reply: Some("hello".into()),
                steps: vec![],
                tips: vec![],
                raw: None,
            },
        ];

        assert_eq!(
            build_turns(&history),
            vec![Turn::user("hi"), Turn::model("hello")]
        );
    }

    #[test]
    fn bot_turn_carries_steps_and_tips() {
        let history = vec![ChatMessage::bot(BotReply::new(
            "Sure.",
            vec!["Open Rooms".into()],
            vec!["Refresh after saving".into()],
        ))];

        let turns = build_turns(&history);
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, TurnRole::Model);
        assert_eq!(
            turns[0].text,
            "Sure.\n\nSteps:\n1. Open Rooms\n\nTips:\n1. Refresh after saving"
        );
    }

    #[test]
    fn json_history_drops_unusable_entries() {
        let history = vec![
            json!({"sender": "user", "text": "hi"}),
            json!(null),
            json!("stray"),
            json!({"sender": "bot", "reply": "hello", "steps": [], "tips": []}),
        ];

        assert_eq!(
            build_turns_from_values(&history),
            vec![Turn::user("hi"), Turn::model("hello")]
        );
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_value(Turn::model("x")).unwrap();
        assert_eq!(json, json!({"role": "model", "text": "x"}));
    }
}
