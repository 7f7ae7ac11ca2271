use serde_json::Value;
use thiserror::Error;

/// Failure of the generation channel. The `Display` output is the message
/// shown to the user, so it stays free of prefixes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The service answered with a non-success status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The request never produced a response.
    #[error("Request to {provider} failed: {detail}")]
    Transport { provider: String, detail: String },

    /// The response (or the JSON inside it) could not be read as field values.
    #[error("Failed to parse AI response")]
    Parse,
}

impl GenerationError {
    /// Build an [`GenerationError::Api`] from an error response body: the
    /// service's own `error.message` (or a plain string `error`, as Ollama
    /// sends) when it has one, otherwise a generic status message.
    pub fn from_error_body(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| {
                v.pointer("/error/message")
                    .or_else(|| v.get("error"))
                    .and_then(Value::as_str)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("API request failed with status {}", status));
        GenerationError::Api { status, message }
    }

    pub fn transport(provider: &str, detail: impl ToString) -> Self {
        GenerationError::Transport {
            provider: provider.to_string(),
            detail: detail.to_string(),
        }
    }
}
