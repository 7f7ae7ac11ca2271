use std::collections::HashSet;

use async_trait::async_trait;

use crate::form::field_model::{FieldDescriptor, FieldValue, GeneratedValues};
use crate::generation::error::GenerationError;
use crate::generation::generator::ValueGenerator;

/// Offline generator: deterministic values from label and type heuristics.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockGenerator;

impl MockGenerator {
    /// Values for every field, synchronously.
    pub fn values_for(fields: &[FieldDescriptor]) -> GeneratedValues {
        let mut seen_groups: HashSet<&str> = HashSet::new();
        let mut values = GeneratedValues::new();

        for field in fields {
            let value = match field.field_type.as_str() {
                "checkbox" => FieldValue::Bool(true),
                // First radio of each group gets picked.
                "radio" => FieldValue::Bool(seen_groups.insert(field.name.as_str())),
                "select" => FieldValue::Text(select_choice(field)),
                "textarea" => FieldValue::Text("This is a test message.".to_string()),
                other => FieldValue::Text(guess_value(&hint_text(field), Some(other))),
            };
            // Fields sharing an id resolve to the same control; the first wins.
            if values.get(&field.id).is_none() {
                values.insert(field.id.clone(), value);
            }
        }

        values
    }
}

#[async_trait]
impl ValueGenerator for MockGenerator {
    fn provider(&self) -> &str {
        "mock"
    }

    async fn generate(&self, fields: &[FieldDescriptor]) -> Result<GeneratedValues, GenerationError> {
        Ok(Self::values_for(fields))
    }
}

/// First non-blank option value, falling back to option text when the
/// descriptor carries no values.
fn select_choice(field: &FieldDescriptor) -> String {
    field
        .option_values
        .as_ref()
        .or(field.options.as_ref())
        .into_iter()
        .flatten()
        .find(|o| !o.trim().is_empty())
        .cloned()
        .unwrap_or_default()
}

/// Label, then placeholder, then name: the first one that says something.
fn hint_text(field: &FieldDescriptor) -> String {
    [field.label.as_deref(), field.placeholder.as_deref(), Some(field.name.as_str())]
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Derive a sensible fill value from the field's label and type.
pub fn guess_value(label: &str, input_type: Option<&str>) -> String {
    let l = label.to_lowercase();

    // Label-based heuristics (checked in order)
    if l.contains("email") {
        return "user@example.com".into();
    }
    if l.contains("password") {
        return "TestPass123!".into();
    }
    if l.contains("phone") || has_word(&l, "tel") {
        return "555-0100".into();
    }
    if l.contains("url") || l.contains("website") {
        return "https://example.com".into();
    }
    if l.contains("zip") || l.contains("postal") {
        return "90210".into();
    }
    if l.contains("username") || l.contains("user") {
        return "testuser".into();
    }
    if l.contains("name") {
        return "Jane Doe".into();
    }
    if l.contains("search") || l.contains("query") {
        return "test query".into();
    }
    if l.contains("date") || l.contains("birth") {
        return "2025-01-15".into();
    }
    if l.contains("number") || l.contains("amount") || l.contains("quantity") || has_word(&l, "age") {
        return "42".into();
    }

    // Fallback to input type
    match input_type {
        Some("email") => "user@example.com".into(),
        Some("password") => "TestPass123!".into(),
        Some("tel") => "555-0100".into(),
        Some("url") => "https://example.com".into(),
        Some("number") | Some("range") => "42".into(),
        Some("date") => "2025-01-15".into(),
        Some("datetime-local") => "2025-01-15T09:30".into(),
        Some("time") => "09:30".into(),
        Some("month") => "2025-01".into(),
        Some("week") => "2025-W03".into(),
        Some("color") => "#336699".into(),
        _ => "test".into(),
    }
}

/// `word` appears in `text` as a whole alphanumeric word.
fn has_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric()).any(|w| w == word)
}
