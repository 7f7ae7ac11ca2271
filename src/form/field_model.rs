use std::borrow::Cow;

use serde::de::{Deserializer, Error as _};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Field descriptors sent to the value generator
// ============================================================================

/// Everything the value generator gets to know about one fillable control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Submitted values of a select's options, parallel to `options`. Kept
    /// out of the JSON sent to the generator.
    #[serde(skip)]
    pub option_values: Option<Vec<String>>,
}

impl FieldDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            field_type: field_type.into(),
            label: None,
            placeholder: None,
            options: None,
            required: None,
            pattern: None,
            tooltip: None,
            context: None,
            option_values: None,
        }
    }

    pub fn is_checkable(&self) -> bool {
        matches!(self.field_type.as_str(), "checkbox" | "radio")
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }
}

// ============================================================================
// Generated values coming back
// ============================================================================

/// A generated value: either a boolean (checkbox-like fields) or text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Bool(bool),
    Text(String),
}

impl FieldValue {
    /// Convert a JSON value. Numbers become text; `null`, arrays and objects
    /// are not usable values.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(FieldValue::Bool(*b)),
            Value::String(s) => Some(FieldValue::Text(s.clone())),
            Value::Number(n) => Some(FieldValue::Text(n.to_string())),
            _ => None,
        }
    }

    /// String coercion used when writing into a text-like control.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Bool(true) => Cow::Borrowed("true"),
            FieldValue::Bool(false) => Cow::Borrowed("false"),
            FieldValue::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }

    /// Checked state for a checkbox/radio: booleans and the exact strings
    /// "true"/"false". Anything else is an option value, not a state.
    pub fn as_checked(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            FieldValue::Text(s) if s == "true" => Some(true),
            FieldValue::Text(s) if s == "false" => Some(false),
            FieldValue::Text(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        FieldValue::from_json(&value)
            .ok_or_else(|| D::Error::custom("expected a string, number or boolean"))
    }
}

/// Field id → generated value, in the order the generator returned them.
///
/// Setting an id twice keeps the original position and replaces the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedValues {
    entries: Vec<(String, FieldValue)>,
}

impl GeneratedValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, value: impl Into<FieldValue>) {
        let id = id.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == id) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((id, value)),
        }
    }

    pub fn get(&self, id: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(k, _)| k == id).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Build from a JSON object. Entries whose value is not a string, number
    /// or boolean are dropped. Returns `None` when `value` is not an object.
    pub fn from_json_object(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut values = GeneratedValues::new();
        for (id, v) in object {
            if let Some(field_value) = FieldValue::from_json(v) {
                values.insert(id.clone(), field_value);
            }
        }
        Some(values)
    }
}

impl<K, V> FromIterator<(K, V)> for GeneratedValues
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = GeneratedValues::new();
        for (k, v) in iter {
            values.insert(k, v);
        }
        values
    }
}

impl Serialize for GeneratedValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for GeneratedValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        GeneratedValues::from_json_object(&value)
            .ok_or_else(|| D::Error::custom("expected a JSON object of field values"))
    }
}
