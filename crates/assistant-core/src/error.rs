use thiserror::Error;

/// Raised when decoded model output does not match the reply schema.
///
/// Never leaves the parser: every variant makes it fall through to the next
/// strategy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Bot output is not an object")]
    NotAnObject,

    #[error("Missing 'reply' string")]
    MissingReply,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing API key. Set GEMINI_API_KEY or api_key in the config file.")]
    MissingApiKey,
}
