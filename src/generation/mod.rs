pub mod error;
pub mod generator;
pub mod mock;
pub mod ollama;
pub mod openai;
pub mod prompt;
pub mod provider;

pub use error::GenerationError;
pub use generator::ValueGenerator;
pub use provider::{Provider, build_generator};
