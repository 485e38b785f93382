//! Configuration loading and parsing
//!
//! Repeated extraction runs over the same recording geometry are easier to
//! drive from a small TOML file than from a long command line. Everything in
//! here is optional; command-line arguments win over file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub recording: RecordingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    /// MFF recording directory to extract from
    pub mff_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RecordingConfig {
    /// Sampling rate in Hz
    pub sfreq: Option<f64>,
    /// Samples per segment
    pub samples_per_segment: Option<usize>,
    /// Number of concatenated segments
    pub n_segments: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    pub format: Option<OutputFormat>,
    pub output_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [input]
            mff_dir = "session01.mff"

            [recording]
            sfreq = 1000.0
            samples_per_segment = 5000

            [output]
            format = "json"
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(
            config.input.mff_dir,
            Some(PathBuf::from("session01.mff"))
        );
        assert_eq!(config.recording.sfreq, Some(1000.0));
        assert_eq!(config.recording.samples_per_segment, Some(5000));
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.input.mff_dir.is_none());
        assert!(config.recording.sfreq.is_none());
    }
}
