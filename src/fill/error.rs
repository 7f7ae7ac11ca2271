use thiserror::Error;

use crate::generation::error::GenerationError;

/// Why a fill did not happen. `Display` is the user-facing message carried
/// in [`FillResponse::error`](crate::fill::trigger::FillResponse).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FillError {
    #[error("Form filling is disabled")]
    Disabled,

    #[error("API key not set")]
    MissingApiKey,

    #[error("Provider not selected")]
    MissingProvider,

    #[error("Model not selected")]
    MissingModel,

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Raised locally, before any request goes out.
    #[error("No form fields found on the page")]
    NoFillableFields,

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl FillError {
    /// Configuration problems, as opposed to page or service problems.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            FillError::MissingApiKey
                | FillError::MissingProvider
                | FillError::MissingModel
                | FillError::UnsupportedProvider(_)
        )
    }
}
