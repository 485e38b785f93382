//! Main decoder API
//!
//! This module provides the primary interface for the decoder library. The
//! EventDecoder struct is the entry point for extracting events from an MFF
//! recording directory or a single ECI event file.

use crate::config::DecoderConfig;
use crate::matrix::EventMatrix;
use crate::types::{EciEvent, RecordingInfo, Result, SampleTable};
use std::path::Path;

/// The main decoder struct, entry point for all extraction operations
#[derive(Debug, Clone, Default)]
pub struct EventDecoder {
    config: DecoderConfig,
}

impl EventDecoder {
    /// Create a decoder with default configuration
    pub fn new() -> Self {
        Self {
            config: DecoderConfig::new(),
        }
    }

    /// Create a decoder with an explicit configuration
    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Borrow the active configuration
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Extract the per-code sample-index table from an MFF directory.
    ///
    /// # Example
    /// ```no_run
    /// use mff_event_decoder::EventDecoder;
    /// use std::path::Path;
    ///
    /// let decoder = EventDecoder::new();
    /// let (table, codes) = decoder
    ///     .read_mff_events(Path::new("recording.mff"), 1000.0)
    ///     .unwrap();
    /// for code in &codes {
    ///     println!("{}: {} occurrences", code, table[code.as_str()].len());
    /// }
    /// ```
    pub fn read_mff_events(&self, mff_dir: &Path, sfreq: f64) -> Result<(SampleTable, Vec<String>)> {
        crate::events::mff::read_mff_events(mff_dir, sfreq, &self.config)
    }

    /// Extract events from an MFF directory and project them onto a dense
    /// event matrix.
    ///
    /// The returned header is an augmented copy of the input with `n_events`
    /// and `event_codes` filled in; the input is never mutated.
    ///
    /// # Example
    /// ```no_run
    /// use mff_event_decoder::{EventDecoder, RecordingInfo};
    /// use std::path::Path;
    ///
    /// let decoder = EventDecoder::new();
    /// let info = RecordingInfo::new(1000.0, vec![5000], 1);
    /// let (matrix, info) = decoder
    ///     .read_events(Path::new("recording.mff"), &info)
    ///     .unwrap();
    /// println!("{} events over {} samples", info.n_events, matrix.n_cols());
    /// ```
    pub fn read_events(
        &self,
        mff_dir: &Path,
        info: &RecordingInfo,
    ) -> Result<(EventMatrix, RecordingInfo)> {
        log::info!("Reading events for recording at {:?}", mff_dir);
        crate::events::mff::read_events(mff_dir, info, &self.config)
    }

    /// Parse a single ECI event file into typed event records.
    ///
    /// # Example
    /// ```no_run
    /// use mff_event_decoder::EventDecoder;
    /// use std::path::Path;
    ///
    /// let decoder = EventDecoder::new();
    /// let events = decoder
    ///     .read_eci_events(Path::new("recording.mff/Events_ECI.xml"))
    ///     .unwrap();
    /// for event in &events {
    ///     println!("{:?}", event.code());
    /// }
    /// ```
    pub fn read_eci_events(&self, path: &Path) -> Result<Vec<EciEvent>> {
        crate::events::eci::parse_eci_events(path)
    }
}
