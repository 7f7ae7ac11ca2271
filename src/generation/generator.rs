use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::form::field_model::{FieldDescriptor, GeneratedValues};
use crate::generation::error::GenerationError;

/// The generation channel: field descriptors in, field values out.
///
/// One call per trigger, no retries. Implementations must not touch the
/// document.
#[async_trait]
pub trait ValueGenerator: Send + Sync {
    /// Short provider name used in logs and transport errors.
    fn provider(&self) -> &str;

    async fn generate(&self, fields: &[FieldDescriptor]) -> Result<GeneratedValues, GenerationError>;
}

/// Read a model's text output as a field-value object.
///
/// Tolerates surrounding whitespace and a Markdown code fence; anything that
/// is not a JSON object is a parse error.
pub fn parse_values_content(content: &str) -> Result<GeneratedValues, GenerationError> {
    let body = strip_code_fence(content.trim());
    let value: Value = serde_json::from_str(body).map_err(|e| {
        debug!(error = %e, "model output is not JSON");
        GenerationError::Parse
    })?;
    GeneratedValues::from_json_object(&value).ok_or(GenerationError::Parse)
}

fn strip_code_fence(content: &str) -> &str {
    let Some(rest) = content.strip_prefix("```") else {
        return content;
    };
    // Drop the info string ("json") on the opening line.
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
