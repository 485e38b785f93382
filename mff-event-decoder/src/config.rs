//! Decoder configuration types
//!
//! The decoder needs very little configuration; extraction semantics are fixed
//! by the vendor format. What can vary is how files are scheduled and how hard
//! the decoder fails on data that falls outside the recording.

use serde::{Deserialize, Serialize};

/// Configuration for the event decoder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Flatten discovered XML files on a parallel iterator. Results are
    /// re-sorted by filename stem afterwards, so extraction order does not
    /// depend on this setting.
    #[serde(default = "default_true")]
    pub parallel_flatten: bool,

    /// Fail extraction when an event maps to a sample outside the recording.
    /// When disabled, such events are logged and skipped instead; useful for
    /// salvaging recordings with a truncated final segment.
    #[serde(default = "default_true")]
    pub strict_bounds: bool,
}

fn default_true() -> bool {
    true
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            parallel_flatten: true,
            strict_bounds: true,
        }
    }
}

impl DecoderConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: enable or disable parallel file flattening
    pub fn with_parallel_flatten(mut self, enabled: bool) -> Self {
        self.parallel_flatten = enabled;
        self
    }

    /// Builder method: enable or disable strict sample bounds checking
    pub fn with_strict_bounds(mut self, enabled: bool) -> Self {
        self.strict_bounds = enabled;
        self
    }
}
