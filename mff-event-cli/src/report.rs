//! Extraction report rendering
//!
//! Turns extraction results into the text or JSON the CLI prints. Rendering is
//! separated from main so the shapes stay testable without a recording on disk.

use anyhow::Result;
use mff_event_decoder::{EciEvent, EventMatrix, RecordingInfo, SampleTable};
use std::path::Path;

/// Human-readable per-code summary of a legacy extraction
pub fn render_summary(
    mff_dir: &Path,
    sfreq: f64,
    table: &SampleTable,
    codes: &[String],
    matrix_info: Option<&(EventMatrix, RecordingInfo)>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("Recording: {:?} ({} Hz)\n", mff_dir, sfreq));
    out.push_str(&format!("Event codes: {}\n\n", codes.len()));

    for code in codes {
        let samples = &table[code.as_str()];
        let first = samples.first().copied().unwrap_or(0);
        let last = samples.last().copied().unwrap_or(0);
        out.push_str(&format!(
            "  {:<12} {:>6} occurrences   samples {} .. {}\n",
            code,
            samples.len(),
            first,
            last
        ));
    }

    if let Some((matrix, info)) = matrix_info {
        out.push_str(&format!(
            "\nEvent matrix: {} rows x {} columns ({} segments)\n",
            matrix.n_rows(),
            matrix.n_cols(),
            info.n_segments
        ));
    }

    out
}

/// JSON rendering of a legacy extraction for downstream tooling
pub fn render_json(
    table: &SampleTable,
    codes: &[String],
    matrix_info: Option<&(EventMatrix, RecordingInfo)>,
) -> Result<String> {
    let mut root = serde_json::Map::new();
    root.insert("event_codes".to_string(), serde_json::to_value(codes)?);
    root.insert("sample_table".to_string(), serde_json::to_value(table)?);
    if let Some((matrix, info)) = matrix_info {
        root.insert(
            "matrix_shape".to_string(),
            serde_json::json!([matrix.n_rows(), matrix.n_cols()]),
        );
        root.insert("n_events".to_string(), serde_json::json!(info.n_events));
    }
    Ok(serde_json::to_string_pretty(&serde_json::Value::Object(root))?)
}

/// Human-readable listing of typed ECI events
pub fn render_eci_summary(eci_path: &Path, events: &[EciEvent]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "ECI file: {:?} ({} events)\n\n",
        eci_path,
        events.len()
    ));

    for event in events {
        let code = event.code().unwrap_or("<uncoded>");
        out.push_str(&format!("  {}", code));
        if let Some(ns) = event.duration_ns() {
            out.push_str(&format!("   duration {} ns", ns));
        }
        if let Some(keys) = event.get("keys").and_then(|v| v.as_keys()) {
            out.push_str(&format!("   {} keys", keys.len()));
        }
        out.push('\n');
    }

    out
}
