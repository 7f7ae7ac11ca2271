use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::form::field_model::{FieldDescriptor, GeneratedValues};
use crate::generation::error::GenerationError;
use crate::generation::generator::{ValueGenerator, parse_values_content};
use crate::generation::prompt::{SYSTEM_PROMPT, build_user_prompt};

pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

// ============================================================================
// OpenAI chat-completions backend
// ============================================================================

pub struct OpenAiGenerator {
    pub endpoint: String,
    pub model: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiGenerator {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self::with_endpoint(api_key, model, DEFAULT_OPENAI_ENDPOINT)
    }

    /// Point at an OpenAI-compatible server. `endpoint` is the base URL,
    /// `/chat/completions` is appended.
    pub fn with_endpoint(api_key: &str, model: &str, endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }
}

#[async_trait]
impl ValueGenerator for OpenAiGenerator {
    fn provider(&self) -> &str {
        "openai"
    }

    async fn generate(&self, fields: &[FieldDescriptor]) -> Result<GeneratedValues, GenerationError> {
        let user_prompt = build_user_prompt(fields);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: &user_prompt },
            ],
            response_format: ResponseFormat { kind: "json_object" },
        };

        debug!(model = %self.model, fields = fields.len(), "requesting values from openai");

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::transport(self.provider(), e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::transport(self.provider(), e))?;

        if !status.is_success() {
            return Err(GenerationError::from_error_body(status.as_u16(), &body));
        }

        let chat: ChatResponse = serde_json::from_str(&body).map_err(|_| GenerationError::Parse)?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(GenerationError::Parse)?;

        parse_values_content(&content)
    }
}
