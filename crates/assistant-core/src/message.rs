use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    /// Anything that is not literally `"user"` is treated as the assistant.
    pub fn from_wire(value: &str) -> Self {
        if value == "user" {
            Sender::User
        } else {
            Sender::Bot
        }
    }
}

/// The strict `{reply, steps, tips}` triple every assistant answer resolves to.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BotReply {
    pub reply: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub tips: Vec<String>,
}

impl BotReply {
    pub fn new(reply: impl Into<String>, steps: Vec<String>, tips: Vec<String>) -> Self {
        Self {
            reply: reply.into(),
            steps,
            tips,
        }
    }

    pub fn text_only(reply: impl Into<String>) -> Self {
        Self::new(reply, Vec::new(), Vec::new())
    }
}

/// A chat message as shown in the conversation.
///
/// `reply`, `steps`, `tips` and `raw` are only meaningful for bot messages.
/// `text` may be empty before [`ChatMessage::normalized`] has run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub sender: Sender,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tips: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            reply: None,
            steps: Vec::new(),
            tips: Vec::new(),
            raw: None,
        }
    }

    /// Build a bot message from a parsed reply. The result is normalized.
    pub fn bot(reply: BotReply) -> Self {
        Self {
            sender: Sender::Bot,
            text: String::new(),
            reply: Some(reply.reply),
            steps: reply.steps,
            tips: reply.tips,
            raw: None,
        }
        .normalized()
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    /// The strict triple carried by a bot message, if any.
    pub fn bot_reply(&self) -> Option<BotReply> {
        if self.is_user() {
            return None;
        }
        Some(BotReply {
            reply: self.reply.clone().unwrap_or_else(|| self.text.clone()),
            steps: self.steps.clone(),
            tips: self.tips.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CallerRole {
    Admin,
    Receptionist,
    Public,
}

impl CallerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallerRole::Admin => "admin",
            CallerRole::Receptionist => "receptionist",
            CallerRole::Public => "public",
        }
    }
}

impl std::str::FromStr for CallerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" | "role_admin" => Ok(CallerRole::Admin),
            "receptionist" | "role_receptionist" => Ok(CallerRole::Receptionist),
            "public" | "guest" => Ok(CallerRole::Public),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Identity of whoever is asking, supplied explicitly by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallerContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<CallerRole>,
}

impl CallerContext {
    pub fn new(name: Option<String>, role: Option<CallerRole>) -> Self {
        Self { name, role }
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_none() && self.role.is_none()
    }

    /// One-line description suitable for a system instruction.
    pub fn describe(&self) -> Option<String> {
        match (&self.name, self.role) {
            (None, None) => None,
            (Some(name), None) => Some(format!("The current user is {name}.")),
            (None, Some(role)) => Some(format!(
                "The current user is signed in as {}.",
                role.as_str()
            )),
            (Some(name), Some(role)) => Some(format!(
                "The current user is {name}, signed in as {}.",
                role.as_str()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_from_wire_defaults_to_bot() {
        assert_eq!(Sender::from_wire("user"), Sender::User);
        assert_eq!(Sender::from_wire("bot"), Sender::Bot);
        assert_eq!(Sender::from_wire("assistant"), Sender::Bot);
    }

    #[test]
    fn bot_message_is_normalized_on_construction() {
        let msg = ChatMessage::bot(BotReply::new(
            "Open the dashboard.",
            vec!["Log in".to_string()],
            vec![],
        ));
        assert_eq!(msg.text, "Open the dashboard.\n\nSteps:\n1. Log in");
        assert!(msg.raw.is_some());
    }

    #[test]
    fn serializes_sender_lowercase_and_skips_empty_fields() {
        let json = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"sender": "user", "text": "hi"}));
    }

    #[test]
    fn caller_role_parses_backend_names() {
        assert_eq!("ROLE_ADMIN".parse::<CallerRole>(), Ok(CallerRole::Admin));
        assert_eq!(
            "Receptionist".parse::<CallerRole>(),
            Ok(CallerRole::Receptionist)
        );
        assert!("doctor".parse::<CallerRole>().is_err());
    }

    #[test]
    fn caller_description() {
        assert_eq!(CallerContext::default().describe(), None);
        let ctx = CallerContext::new(Some("Asha".into()), Some(CallerRole::Receptionist));
        assert_eq!(
            ctx.describe().as_deref(),
            Some("The current user is Asha, signed in as receptionist.")
        );
    }
}
