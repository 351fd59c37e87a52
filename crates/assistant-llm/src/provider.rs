use std::fmt::Debug;

use assistant_core::{CallerContext, ConfigError, Turn};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LLMError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Protocol conversion error: {0}")]
    Protocol(#[from] crate::protocol::ProtocolError),
}

pub type Result<T> = std::result::Result<T, LLMError>;

/// Structured provider payload that knows how to produce its own text.
pub trait TextAccessor: Debug + Send + Sync {
    fn text(&self) -> Option<String>;
}

/// What a conversation returns for one message.
#[derive(Debug)]
pub enum ModelResponse {
    /// The provider handed back plain text.
    Text(String),
    /// The provider handed back a structured payload.
    Structured(Box<dyn TextAccessor>),
    /// Nothing usable came back.
    Empty,
}

impl ModelResponse {
    /// Raw response text; empty when the provider produced none.
    pub fn text(&self) -> String {
        match self {
            ModelResponse::Text(text) => text.clone(),
            ModelResponse::Structured(payload) => payload.text().unwrap_or_default(),
            ModelResponse::Empty => String::new(),
        }
    }
}

/// A chat with the model, seeded with prior history.
#[async_trait]
pub trait Conversation: Send {
    /// Send one user message and wait for the model's answer.
    ///
    /// Dropping the returned future aborts the request.
    async fn send(&mut self, query: &str) -> Result<ModelResponse>;
}

/// Entry point to a generative model.
pub trait ModelClient: Send + Sync {
    /// Start a fresh conversation.
    ///
    /// # Arguments
    /// * `history` - Prior turns, oldest first
    /// * `caller` - Who is asking; providers may fold it into their instructions
    fn start_conversation(&self, history: Vec<Turn>, caller: &CallerContext)
        -> Box<dyn Conversation>;
}
