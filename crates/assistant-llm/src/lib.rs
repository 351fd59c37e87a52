pub mod http;
pub mod prompt;
pub mod protocol;
pub mod provider;
pub mod providers;

pub use assistant_core::AssistantConfig;
pub use prompt::DEFAULT_SYSTEM_PROMPT;
pub use provider::{Conversation, LLMError, ModelClient, ModelResponse, Result, TextAccessor};
pub use providers::GeminiProvider;
