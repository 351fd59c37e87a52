pub mod gemini;

pub use gemini::{GeminiConversation, GeminiProvider};
