//! Event extraction paths
//!
//! Two independent readers of the vendor's event files: the schema-free legacy
//! path over every `Events_*` file in a recording directory, and the typed
//! path over a single ECI file.

pub mod eci;
pub mod mff;

// Re-export key functions for convenience
pub use eci::parse_eci_events;
pub use mff::{read_events, read_mff_events};
