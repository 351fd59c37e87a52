//! assistant-core - Core types for the MediTrack assistant
//!
//! This crate provides the foundational pieces shared by the provider and
//! dispatch crates:
//! - `message` - ChatMessage, BotReply and the caller identity
//! - `normalize` - canonical chat message shape
//! - `parse` - recovery of the strict reply triple from free model output
//! - `turn` - role-tagged provider history
//! - `config` - layered assistant configuration

pub mod config;
pub mod error;
pub mod message;
pub mod normalize;
pub mod parse;
pub mod paths;
pub mod turn;

// Re-export commonly used types
pub use config::{AssistantConfig, ProxyAuth, RetrySettings};
pub use error::{ConfigError, SchemaError};
pub use message::{BotReply, CallerContext, CallerRole, ChatMessage, Sender};
pub use normalize::normalize;
pub use parse::{parse_bot_reply, try_parse, validate_bot_json, ParsedReply};
pub use turn::{build_turns, build_turns_from_values, Turn, TurnRole};
