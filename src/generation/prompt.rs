use crate::form::field_model::FieldDescriptor;

pub const SYSTEM_PROMPT: &str = "You are an AI assistant that generates realistic form data for testing purposes. \
For each form field, analyze its type, label, placeholder, and context to generate an appropriate value. \
The data should be realistic but not contain any actual personal information. \
Always return a valid JSON object where keys are field IDs and values are the generated data.";

const FIELD_SEPARATOR: &str = "\n---\n";

/// One field as a block of `Key: value` lines. Absent or empty properties
/// are left out; `Required` only appears when it is true.
pub fn describe_field(field: &FieldDescriptor) -> String {
    let mut out = format!("Field ID: {}\nType: {}\n", field.id, field.field_type);

    let optional = [
        ("Label", field.label.as_deref()),
        ("Placeholder", field.placeholder.as_deref()),
    ];
    for (key, value) in optional {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            out.push_str(&format!("{}: {}\n", key, v));
        }
    }

    if field.is_required() {
        out.push_str("Required: Yes\n");
    }

    let optional = [
        ("Pattern", field.pattern.as_deref()),
        ("Tooltip", field.tooltip.as_deref()),
        ("Context", field.context.as_deref()),
    ];
    for (key, value) in optional {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            out.push_str(&format!("{}: {}\n", key, v));
        }
    }

    if let Some(options) = field.options.as_ref().filter(|o| !o.is_empty()) {
        out.push_str(&format!("Options: {}\n", options.join(", ")));
    }

    out
}

pub fn build_user_prompt(fields: &[FieldDescriptor]) -> String {
    let described = fields
        .iter()
        .map(describe_field)
        .collect::<Vec<_>>()
        .join(FIELD_SEPARATOR);

    format!(
r#"Please generate realistic values for the following form fields:

{}

Respond ONLY with a JSON object where keys are field IDs and values are appropriate realistic values for each field. Each value should match the expected format for its field type. Use true or false for checkboxes and one of the listed options for selects."#,
        described
    )
}

/// Single-string prompt for completion-style backends.
pub fn build_combined_prompt(fields: &[FieldDescriptor]) -> String {
    format!("{}\n\n{}", SYSTEM_PROMPT, build_user_prompt(fields))
}
