//! XML layer: element tree loading and schema-free flattening
//!
//! This module contains the quick-xml based tree loader and the shape-heuristic
//! flattener that turns vendor event-log XML into recursive [`Node`] values.

pub mod flatten;
pub mod tree;

// Re-export key types for convenience
pub use flatten::{flatten_children, flatten_element, flatten_file, strip_namespace, Node};
pub use tree::XmlElement;
