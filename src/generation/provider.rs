use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::fill::error::FillError;
use crate::fill::settings::FillSettings;
use crate::generation::generator::ValueGenerator;
use crate::generation::mock::MockGenerator;
use crate::generation::ollama::{DEFAULT_OLLAMA_ENDPOINT, OllamaGenerator};
use crate::generation::openai::{DEFAULT_OPENAI_ENDPOINT, OpenAiGenerator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Ollama,
    Mock,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Ollama => "ollama",
            Provider::Mock => "mock",
        }
    }

    pub fn needs_model(&self) -> bool {
        !matches!(self, Provider::Mock)
    }

    pub fn needs_api_key(&self) -> bool {
        matches!(self, Provider::OpenAi)
    }
}

impl FromStr for Provider {
    type Err = FillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "ollama" => Ok(Provider::Ollama),
            "mock" => Ok(Provider::Mock),
            _ => Err(FillError::UnsupportedProvider(s.trim().to_string())),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validate the settings and build the matching generator.
///
/// Checks run in a fixed order: provider present, provider supported, model
/// present, API key present. No network or DOM work happens here.
pub fn build_generator(settings: &FillSettings) -> Result<Box<dyn ValueGenerator>, FillError> {
    let provider: Provider = settings.provider().ok_or(FillError::MissingProvider)?.parse()?;

    let model = match (provider.needs_model(), settings.model()) {
        (true, None) => return Err(FillError::MissingModel),
        (_, model) => model.unwrap_or_default(),
    };

    let api_key = match (provider.needs_api_key(), settings.api_key()) {
        (true, None) => return Err(FillError::MissingApiKey),
        (_, key) => key.unwrap_or_default(),
    };

    debug!(%provider, model, "selected value generator");

    let generator: Box<dyn ValueGenerator> = match provider {
        Provider::OpenAi => Box::new(OpenAiGenerator::with_endpoint(
            api_key,
            model,
            settings.endpoint().unwrap_or(DEFAULT_OPENAI_ENDPOINT),
        )),
        Provider::Ollama => Box::new(OllamaGenerator::new(
            settings.endpoint().unwrap_or(DEFAULT_OLLAMA_ENDPOINT),
            model,
        )),
        Provider::Mock => Box::new(MockGenerator),
    };

    Ok(generator)
}
