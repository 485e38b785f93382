//! MFF Event Decoder Library
//!
//! A stateless, reusable library for extracting event/marker annotations from
//! EGI MFF recording directories and aligning them to the continuous signal.
//!
//! # Architecture
//!
//! This library is intentionally minimal and focused on event extraction:
//! - Flattens the vendor's schema-free event-log XML into recursive nodes
//! - Aligns absolute wall-clock event onsets to integer sample indices
//! - Projects occurrences onto a dense per-code event matrix
//! - Parses ECI event files into typed records
//! - Synthesizes a single weighted trigger channel from binary trigger rows
//!
//! The library does NOT:
//! - Read the continuous signal data or the rest of the MFF container
//! - Discover recordings on disk
//! - Interpret event semantics beyond the vendor schema
//!
//! The sampling rate and segment geometry come from the surrounding MFF signal
//! reader as a [`RecordingInfo`] value.
//!
//! # Example Usage
//!
//! ```no_run
//! use mff_event_decoder::{EventDecoder, RecordingInfo};
//! use std::path::Path;
//!
//! let decoder = EventDecoder::new();
//! let info = RecordingInfo::new(1000.0, vec![5000], 1);
//!
//! let (matrix, info) = decoder
//!     .read_events(Path::new("recording.mff"), &info)
//!     .unwrap();
//!
//! for (row, code) in info.event_codes.iter().enumerate() {
//!     let occurrences = matrix.row(row).iter().filter(|&&v| v != 0.0).count();
//!     println!("{}: {} occurrences", code, occurrences);
//! }
//! ```

// Public modules
pub mod config;
pub mod decoder;
pub mod events;
pub mod matrix;
pub mod timestamp;
pub mod trigger;
pub mod types;
pub mod xml;

// Re-export main types for convenience
pub use config::DecoderConfig;
pub use decoder::EventDecoder;
pub use matrix::EventMatrix;
pub use trigger::combine_triggers;
pub use types::{
    EciEvent, EciTimestamp, EventError, EventMarker, EventValue, KeyValue, MffTimestamp,
    RecordingInfo, Result, SampleTable,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
