//! Google Gemini provider implementation.

use assistant_core::{AssistantConfig, CallerContext, Turn};
use async_trait::async_trait;
use reqwest::Client;

use crate::http::build_http_client;
use crate::prompt::{system_instruction, DEFAULT_SYSTEM_PROMPT};
use crate::protocol::gemini::{
    GeminiContent, GeminiErrorBody, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig,
};
use crate::protocol::{FromProvider, ProtocolError, ToProviderBatch};
use crate::provider::{Conversation, LLMError, ModelClient, ModelResponse, Result};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Google Gemini API provider.
#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    system_prompt: String,
    generation_config: Option<GenerationConfig>,
}

impl GeminiProvider {
    /// Create a new Gemini provider with an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            generation_config: Some(GenerationConfig::json()),
        }
    }

    /// Build from configuration: API key, base URL, model, persona and proxies.
    pub fn from_config(config: &AssistantConfig) -> Result<Self> {
        let mut provider = Self::new(config.api_key()?).with_client(build_http_client(config)?);
        if let Some(base_url) = config.api_base.as_deref() {
            provider = provider.with_base_url(base_url);
        }
        if let Some(model) = config.model.as_deref() {
            provider = provider.with_model(model);
        }
        if let Some(prompt) = config.system_prompt.as_deref() {
            provider = provider.with_system_prompt(prompt);
        }
        Ok(provider)
    }

    /// Set a custom base URL (e.g., for proxies or alternative endpoints).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model name (e.g., "gemini-2.5-flash", "gemini-2.5-pro").
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_generation_config(mut self, config: Option<GenerationConfig>) -> Self {
        self.generation_config = config;
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    async fn generate(&self, request: &GenerateContentRequest) -> Result<GenerateContentResponse> {
        let url = self.endpoint();
        log::debug!(
            "Gemini request to {} with {} content(s)",
            url,
            request.contents.len()
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            let message = serde_json::from_str::<GeminiErrorBody>(&text)
                .map(|body| format!("{} {}", body.error.status, body.error.message))
                .unwrap_or(text);

            if status == 401 || status == 403 {
                return Err(LLMError::Auth(format!(
                    "Gemini authentication failed: {}. Please check your API key.",
                    message.trim()
                )));
            }

            return Err(LLMError::Api(format!(
                "Gemini API error: HTTP {}: {}",
                status,
                message.trim()
            )));
        }

        let body = response.bytes().await?;
        let parsed: GenerateContentResponse = serde_json::from_slice(&body)?;

        if parsed.candidates.is_empty() {
            if let Some(reason) = parsed.block_reason() {
                return Err(LLMError::Api(format!("Gemini blocked the prompt: {reason}")));
            }
        }

        Ok(parsed)
    }
}

impl ModelClient for GeminiProvider {
    fn start_conversation(
        &self,
        history: Vec<Turn>,
        caller: &CallerContext,
    ) -> Box<dyn Conversation> {
        Box::new(GeminiConversation {
            provider: self.clone(),
            history,
            system_instruction: system_instruction(&self.system_prompt, caller),
        })
    }
}

/// Stateful Gemini chat: successful exchanges are appended to the history.
pub struct GeminiConversation {
    provider: GeminiProvider,
    history: Vec<Turn>,
    system_instruction: String,
}

impl GeminiConversation {
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    fn build_request(&self, query: &str) -> Result<GenerateContentRequest> {
        let mut contents: Vec<GeminiContent> = self.history.to_provider_batch()?;
        contents.push(GeminiContent::text(Some("user"), query));

        let system_instruction = (!self.system_instruction.is_empty())
            .then(|| GeminiContent::text(None, self.system_instruction.clone()));

        Ok(GenerateContentRequest {
            contents,
            system_instruction,
            generation_config: self.provider.generation_config.clone(),
        })
    }
}

#[async_trait]
impl Conversation for GeminiConversation {
    async fn send(&mut self, query: &str) -> Result<ModelResponse> {
        let request = self.build_request(query)?;
        let response = self.provider.generate(&request).await?;

        let reply = reply_turn(&response)?;
        self.history.push(Turn::user(query));

        Ok(match reply {
            Some(turn) => {
                self.history.push(turn);
                ModelResponse::Structured(Box::new(response))
            }
            None => ModelResponse::Empty,
        })
    }
}

/// Model turn for the first candidate, or `None` when it carries no text.
/// Gemini may omit the role on candidates; it is always the model speaking.
fn reply_turn(response: &GenerateContentResponse) -> Result<Option<Turn>> {
    let Some(mut content) = response
        .candidates
        .first()
        .and_then(|candidate| candidate.content.clone())
    else {
        return Ok(None);
    };

    content.role.get_or_insert_with(|| "model".to_string());
    match Turn::from_provider(content) {
        Ok(turn) => Ok(Some(turn)),
        Err(ProtocolError::InvalidContent(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
