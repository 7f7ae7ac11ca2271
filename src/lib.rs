pub mod cli;
pub mod dom;
pub mod fill;
pub mod form;
pub mod generation;
pub mod trace;

pub use dom::{Document, NodeId};
pub use fill::{FillError, FillResponse, FillSettings, fill_with, trigger_fill};
pub use form::{FieldDescriptor, FieldValue, GeneratedValues, apply_values, extract_fields};
pub use generation::{GenerationError, ValueGenerator};
