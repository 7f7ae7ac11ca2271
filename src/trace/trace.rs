use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// Pipeline stage a trace line records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStage {
    Triggered,
    Extracted,
    Generated,
    Applied,
    Failed,
}

/// One JSON line in the fill trace.
#[derive(Debug, Serialize)]
pub struct FillTraceEvent {
    pub timestamp_ms: u128,
    pub run: u64,
    pub stage: FillStage,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FillTraceEvent {
    pub fn now(run: u64, stage: FillStage) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            run,
            stage,
            provider: None,
            field_count: None,
            value_count: None,
            applied: None,
            skipped: vec![],
            fingerprint: None,
            error: None,
        }
    }

    pub fn with_provider(mut self, provider: impl ToString) -> Self {
        self.provider = Some(provider.to_string());
        self
    }

    pub fn with_fields(mut self, count: usize) -> Self {
        self.field_count = Some(count);
        self
    }

    pub fn with_values(mut self, count: usize) -> Self {
        self.value_count = Some(count);
        self
    }

    pub fn with_applied(mut self, applied: usize, skipped: &[String]) -> Self {
        self.applied = Some(applied);
        self.skipped = skipped.to_vec();
        self
    }

    pub fn with_fingerprint(mut self, fingerprint: impl ToString) -> Self {
        self.fingerprint = Some(fingerprint.to_string());
        self
    }

    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }
}
