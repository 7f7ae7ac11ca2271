pub mod controls;
pub mod events;
pub mod loader;
pub mod node;
pub mod parser;
pub mod query;
pub mod serialize;

pub use events::{DomEvent, EventKind};
pub use node::{Document, NodeId};
