pub mod error;
pub mod settings;
pub mod trigger;

pub use error::FillError;
pub use settings::FillSettings;
pub use trigger::{FillReport, FillResponse, FormFiller, fill_with, trigger_fill};
