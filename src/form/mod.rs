pub mod context;
pub mod extractor;
pub mod field_model;
pub mod fingerprint;
pub mod writer;

pub use extractor::extract_fields;
pub use field_model::{FieldDescriptor, FieldValue, GeneratedValues};
pub use writer::{ControlKind, WriteReport, apply_values};
