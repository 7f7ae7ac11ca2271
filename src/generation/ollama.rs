use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::form::field_model::{FieldDescriptor, GeneratedValues};
use crate::generation::error::GenerationError;
use crate::generation::generator::{ValueGenerator, parse_values_content};
use crate::generation::prompt::build_combined_prompt;

pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434/api/generate";

// ============================================================================
// Ollama Backend
// ============================================================================

pub struct OllamaGenerator {
    pub endpoint: String,
    pub model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    format: &'static str,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaGenerator {
    pub fn new(endpoint: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_model(model: &str) -> Self {
        Self::new(DEFAULT_OLLAMA_ENDPOINT, model)
    }
}

#[async_trait]
impl ValueGenerator for OllamaGenerator {
    fn provider(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, fields: &[FieldDescriptor]) -> Result<GeneratedValues, GenerationError> {
        let request = OllamaRequest {
            model: &self.model,
            prompt: build_combined_prompt(fields),
            stream: false,
            format: "json",
        };

        debug!(model = %self.model, endpoint = %self.endpoint, "requesting values from ollama");

        let response = self
            .client
            .post(&self.endpoint)
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

        let ollama_response: OllamaResponse =
            serde_json::from_str(&body).map_err(|_| GenerationError::Parse)?;
        parse_values_content(&ollama_response.response)
    }
}
