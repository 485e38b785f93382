//! Core types for the MFF event decoder library
//!
//! This module defines the fundamental types the decoder produces when extracting
//! event annotations from an MFF recording directory. The decoder is stateless and
//! only outputs extracted events and tables, it does not own the recording itself.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wall-clock timestamp of a legacy event marker (no timezone attached)
pub type MffTimestamp = NaiveDateTime;

/// Wall-clock timestamp of a typed ECI event (carries the vendor's UTC offset)
pub type EciTimestamp = DateTime<FixedOffset>;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, EventError>;

/// Mapping from event code to the ordered sample indices at which it occurs.
///
/// Key order is first-seen order across all event files and doubles as the
/// event code registry.
pub type SampleTable = IndexMap<String, Vec<i64>>;

/// Errors that can occur during event extraction
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Failed to parse XML file {path}: {message}")]
    XmlParse { path: String, message: String },

    #[error("Malformed event data: {0}")]
    MalformedInput(String),

    #[error("Malformed timestamp: {0}")]
    MalformedTimestamp(String),

    #[error("Unknown schema element: {0}")]
    UnknownSchemaElement(String),

    #[error("Event '{code}' at sample {sample} is outside the recording (0..{cols})")]
    SampleOutOfRange {
        code: String,
        sample: i64,
        cols: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One event occurrence from the legacy `Events_*` extraction path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventMarker {
    /// Event code string as written by the acquisition software
    pub code: String,
    /// Onset in seconds relative to the recording start
    pub start: f64,
    /// Onset as a sample index, truncated toward zero
    pub start_sample: i64,
    /// Offset in seconds relative to the recording start
    pub end: f64,
    /// Channel association. The event log never carries one, so this stays `None`;
    /// kept so markers line up with annotation consumers that expect the field.
    pub chan: Option<u32>,
}

/// Recording header context consumed and produced by event extraction
///
/// `sfreq`, `last_samps` and `n_segments` come from the surrounding MFF signal
/// reader. `read_events` never mutates its input; it returns a copy with
/// `n_events` and `event_codes` filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingInfo {
    /// Sampling rate in Hz
    pub sfreq: f64,
    /// Per-segment sample counts; the final element is the per-segment count
    /// used for matrix sizing
    pub last_samps: Vec<usize>,
    /// Number of concatenated segments, at least 1
    pub n_segments: usize,
    /// Number of distinct event codes (output field)
    #[serde(default)]
    pub n_events: usize,
    /// Distinct event codes in first-seen order (output field)
    #[serde(default)]
    pub event_codes: Vec<String>,
}

impl RecordingInfo {
    /// Create a header record for a recording without extracted events yet
    pub fn new(sfreq: f64, last_samps: Vec<usize>, n_segments: usize) -> Self {
        Self {
            sfreq,
            last_samps,
            n_segments,
            n_events: 0,
            event_codes: Vec::new(),
        }
    }

    /// Total column count of the event matrix for this recording
    pub fn total_samples(&self) -> Result<usize> {
        let per_segment = self.last_samps.last().ok_or_else(|| {
            EventError::MalformedInput("recording header has an empty last_samps list".to_string())
        })?;
        Ok(self.n_segments * per_segment)
    }
}

/// A typed event parsed from an ECI event file
///
/// Fields appear in document order under their stripped tag names. Only tags
/// present in the file show up here; the conversion table is closed, so an
/// unrecognized tag fails the parse instead of landing in this map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EciEvent {
    #[serde(flatten)]
    pub fields: IndexMap<String, EventValue>,
}

impl EciEvent {
    /// Look up a field by its stripped tag name
    pub fn get(&self, tag: &str) -> Option<&EventValue> {
        self.fields.get(tag)
    }

    /// The event code, when the file carries one
    pub fn code(&self) -> Option<&str> {
        self.get("code").and_then(EventValue::as_str)
    }

    /// Event duration in nanoseconds, when the file carries one
    pub fn duration_ns(&self) -> Option<i64> {
        self.get("duration").and_then(EventValue::as_i64)
    }
}

/// Typed value of a single ECI event field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventValue {
    /// Absolute event onset with the vendor's UTC offset
    Timestamp(EciTimestamp),
    /// Integer field (durations are nanoseconds)
    Integer(i64),
    /// Boolean field
    Boolean(bool),
    /// Free-text field
    Text(String),
    /// Nested key payload, keyed by the raw key code
    Keys(IndexMap<String, KeyValue>),
}

impl EventValue {
    /// Convert to i64 if this value is integer-like
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            EventValue::Integer(v) => Some(*v),
            EventValue::Boolean(v) => Some(if *v { 1 } else { 0 }),
            _ => None,
        }
    }

    /// Borrow the text content if this is a text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            EventValue::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Check truthiness of a boolean value
    pub fn as_bool(&self) -> bool {
        matches!(self, EventValue::Boolean(true))
    }

    /// Borrow the parsed timestamp if this is a timestamp value
    pub fn as_timestamp(&self) -> Option<&EciTimestamp> {
        match self {
            EventValue::Timestamp(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow the key payload if this is a keys value
    pub fn as_keys(&self) -> Option<&IndexMap<String, KeyValue>> {
        match self {
            EventValue::Keys(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for EventValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventValue::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
            EventValue::Integer(v) => write!(f, "{}", v),
            EventValue::Boolean(v) => write!(f, "{}", if *v { "true" } else { "false" }),
            EventValue::Text(v) => write!(f, "{}", v),
            EventValue::Keys(keys) => write!(f, "<{} keys>", keys.len()),
        }
    }
}

/// Scalar value of one entry in an event's key payload
///
/// The width is declared by the `dataType` attribute in the file, not inferred
/// from the text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum KeyValue {
    /// 16-bit integer (`dataType="short"`)
    Short(i16),
    /// 64-bit integer (`dataType="long"`)
    Long(i64),
    /// String payload (`dataType="string"` or `"TEXT"`)
    Text(String),
}

impl KeyValue {
    /// Widen to i64 if this is an integer value
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            KeyValue::Short(v) => Some(*v as i64),
            KeyValue::Long(v) => Some(*v),
            KeyValue::Text(_) => None,
        }
    }

    /// Borrow the text content if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            KeyValue::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Short(v) => write!(f, "{}", v),
            KeyValue::Long(v) => write!(f, "{}", v),
            KeyValue::Text(v) => write!(f, "{}", v),
        }
    }
}
