use serde::{Deserialize, Serialize};

/// Resolved settings for one trigger.
///
/// Empty strings count as unset, so a config file with `api_key: ""` behaves
/// like one without the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Overrides the provider's default base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl Default for FillSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: None,
            model: None,
            api_key: None,
            endpoint: None,
        }
    }
}

impl FillSettings {
    pub fn provider(&self) -> Option<&str> {
        non_blank(&self.provider)
    }

    pub fn model(&self) -> Option<&str> {
        non_blank(&self.model)
    }

    pub fn api_key(&self) -> Option<&str> {
        non_blank(&self.api_key)
    }

    pub fn endpoint(&self) -> Option<&str> {
        non_blank(&self.endpoint)
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn default_true() -> bool {
    true
}
