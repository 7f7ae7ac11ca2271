use std::sync::Mutex;

use async_trait::async_trait;
use mock_pilot::form::{FieldDescriptor, GeneratedValues};
use mock_pilot::generation::{GenerationError, ValueGenerator};

/// Returns a fixed value map and remembers what it was asked for.
pub struct RecordingGenerator {
    values: GeneratedValues,
    pub requests: Mutex<Vec<Vec<FieldDescriptor>>>,
}

impl RecordingGenerator {
    pub fn new(values: GeneratedValues) -> Self {
        Self {
            values,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Vec<FieldDescriptor> {
        self.requests.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ValueGenerator for RecordingGenerator {
    fn provider(&self) -> &str {
        "recording"
    }

    async fn generate(&self, fields: &[FieldDescriptor]) -> Result<GeneratedValues, GenerationError> {
        self.requests.lock().unwrap().push(fields.to_vec());
        Ok(self.values.clone())
    }
}

/// Always fails with the given error.
pub struct FailingGenerator(pub GenerationError);

#[async_trait]
impl ValueGenerator for FailingGenerator {
    fn provider(&self) -> &str {
        "failing"
    }

    async fn generate(&self, _fields: &[FieldDescriptor]) -> Result<GeneratedValues, GenerationError> {
        Err(self.0.clone())
    }
}
