//! Legacy event extraction from an MFF recording directory
//!
//! An MFF recording is a directory of sibling XML files. Every `Events_*.xml`
//! file holds marker occurrences with absolute wall-clock onsets; `info.xml`
//! holds the recording start time. Extraction flattens all XML files with the
//! schema-free converter, aligns each occurrence to the recording start and
//! projects the result onto a per-code sample-index table and a dense event
//! matrix.
//!
//! Two layout assumptions are carried over from the vendor's observed files
//! and treated as preconditions rather than inferred rules: some entry of the
//! flattened `info.xml` carries a `recordTime` key, and the first two entries
//! of every flattened `Events_*` file are a fixed header pair, not events.

use crate::config::DecoderConfig;
use crate::matrix::EventMatrix;
use crate::timestamp::parse_mff_timestamp;
use crate::types::{
    EventError, EventMarker, MffTimestamp, RecordingInfo, Result, SampleTable,
};
use crate::xml::{flatten_file, Node};
use indexmap::IndexMap;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Filename prefix that marks an XML file as an event source
const EVENT_FILE_PREFIX: &str = "Events_";

/// Number of fixed non-event header entries at the front of every flattened
/// event file
const EVENT_HEADER_ENTRIES: usize = 2;

/// Extract the per-code sample-index table from an MFF directory.
///
/// Returns the table together with the list of distinct event codes in
/// first-seen order (file order, then occurrence order within a file). Event
/// files are processed in sorted filename-stem order so repeated runs over the
/// same directory always agree.
pub fn read_mff_events(
    mff_dir: &Path,
    sfreq: f64,
    config: &DecoderConfig,
) -> Result<(SampleTable, Vec<String>)> {
    log::info!("Extracting events from MFF directory: {:?}", mff_dir);

    let xml_files = discover_xml_files(mff_dir)?;
    log::debug!("Found {} XML files", xml_files.len());

    let flattened = flatten_all(&xml_files, config)?;
    let start_time = find_record_time(&flattened)?;
    log::debug!("Recording start time: {}", start_time);

    let mut markers: Vec<EventMarker> = Vec::new();
    let mut codes: Vec<String> = Vec::new();

    for (stem, node) in &flattened {
        if !stem.starts_with(EVENT_FILE_PREFIX) {
            continue;
        }
        let entries = node.as_list().ok_or_else(|| {
            EventError::MalformedInput(format!("event file '{}' did not flatten to a sequence", stem))
        })?;

        for entry in entries.iter().skip(EVENT_HEADER_ENTRIES) {
            let marker = marker_from_entry(entry, stem, start_time, sfreq)?;
            if !codes.contains(&marker.code) {
                codes.push(marker.code.clone());
            }
            markers.push(marker);
        }
    }

    let mut table: SampleTable = IndexMap::new();
    for code in &codes {
        let samples = markers
            .iter()
            .filter(|marker| &marker.code == code)
            .map(|marker| marker.start_sample)
            .collect();
        table.insert(code.clone(), samples);
    }

    log::info!(
        "Extracted {} occurrences across {} event codes",
        markers.len(),
        codes.len()
    );
    Ok((table, codes))
}

/// Extract events and project them onto a dense event matrix.
///
/// The input header is not touched; the returned copy carries `n_events` and
/// `event_codes`. Row `n` of the matrix holds the value `n + 1` at every
/// sample where its code occurs. An occurrence within a code can repeat a
/// sample index; the later write simply lands on the same value. A sample
/// outside the matrix is an error under `strict_bounds`, otherwise it is
/// logged and skipped.
pub fn read_events(
    mff_dir: &Path,
    info: &RecordingInfo,
    config: &DecoderConfig,
) -> Result<(EventMatrix, RecordingInfo)> {
    let n_cols = info.total_samples()?;
    let (table, codes) = read_mff_events(mff_dir, info.sfreq, config)?;

    let mut updated = info.clone();
    updated.n_events = codes.len();
    updated.event_codes = codes.clone();

    let mut matrix = EventMatrix::zeros(codes.len(), n_cols);
    for (row, code) in codes.iter().enumerate() {
        for &sample in &table[code.as_str()] {
            if sample < 0 || sample as usize >= n_cols {
                if config.strict_bounds {
                    return Err(EventError::SampleOutOfRange {
                        code: code.clone(),
                        sample,
                        cols: n_cols,
                    });
                }
                log::warn!(
                    "Skipping event '{}' at sample {} outside the recording (0..{})",
                    code,
                    sample,
                    n_cols
                );
                continue;
            }
            matrix.set(row, sample as usize, (row + 1) as f64);
        }
    }

    Ok((matrix, updated))
}

/// List the XML files directly inside the MFF directory, keyed by stem and
/// sorted by stem
fn discover_xml_files(mff_dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(mff_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("xml") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            files.push((stem.to_string(), path));
        }
    }
    // read_dir order is filesystem-dependent; extraction order must not be
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

/// Flatten every discovered file, in parallel when configured.
///
/// Input order is preserved in the output, so the stem sort above fixes the
/// enumeration order either way.
fn flatten_all(
    xml_files: &[(String, PathBuf)],
    config: &DecoderConfig,
) -> Result<Vec<(String, Node)>> {
    let flatten_one = |(stem, path): &(String, PathBuf)| -> Result<(String, Node)> {
        let node = flatten_file(path)?;
        Ok((stem.clone(), node))
    };

    if config.parallel_flatten {
        xml_files.par_iter().map(flatten_one).collect()
    } else {
        xml_files.iter().map(flatten_one).collect()
    }
}

/// Locate the recording start time inside the flattened `info.xml`.
///
/// The first flattened entry carrying a `recordTime` key wins. Both the file
/// and the key are required; a directory without them is not a usable MFF
/// recording.
fn find_record_time(flattened: &[(String, Node)]) -> Result<MffTimestamp> {
    let info = flattened
        .iter()
        .find(|(stem, _)| stem == "info")
        .map(|(_, node)| node)
        .ok_or_else(|| {
            EventError::MalformedInput("MFF directory has no info.xml".to_string())
        })?;

    let entries = info.as_list().ok_or_else(|| {
        EventError::MalformedInput("info.xml did not flatten to a sequence".to_string())
    })?;

    for entry in entries {
        if let Some(value) = entry.get("recordTime") {
            let raw = value.as_str().ok_or_else(|| {
                EventError::MalformedInput("recordTime entry is not a scalar".to_string())
            })?;
            return parse_mff_timestamp(raw);
        }
    }

    Err(EventError::MalformedInput(
        "info.xml has no recordTime entry".to_string(),
    ))
}

/// Build one marker from a flattened event occurrence
fn marker_from_entry(
    entry: &Node,
    stem: &str,
    start_time: MffTimestamp,
    sfreq: f64,
) -> Result<EventMarker> {
    let missing = |field: &str| {
        EventError::MalformedInput(format!("event in '{}' is missing '{}'", stem, field))
    };

    let begin_time = entry
        .get("beginTime")
        .and_then(Node::as_str)
        .ok_or_else(|| missing("beginTime"))?;
    let code = entry
        .get("code")
        .and_then(Node::as_str)
        .ok_or_else(|| missing("code"))?;
    let duration = entry
        .get("duration")
        .and_then(Node::as_str)
        .ok_or_else(|| missing("duration"))?;

    let event_start = parse_mff_timestamp(begin_time)?;
    let micros = event_start
        .signed_duration_since(start_time)
        .num_microseconds()
        .ok_or_else(|| {
            EventError::MalformedInput(format!(
                "event in '{}' lies implausibly far from the recording start",
                stem
            ))
        })?;
    let start = micros as f64 / 1e6;

    let duration_ns: f64 = duration.parse().map_err(|_| {
        EventError::MalformedInput(format!("invalid event duration '{}' in '{}'", duration, stem))
    })?;

    Ok(EventMarker {
        code: code.to_string(),
        start,
        // truncation toward zero, not rounding; a marker between two samples
        // belongs to the earlier one
        start_sample: (start * sfreq).trunc() as i64,
        end: start + duration_ns / 1e9,
        chan: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const INFO_XML: &str = r#"<?xml version="1.0"?>
<fileInfo xmlns="http://www.egi.com/info_mff">
    <fileVersion>3</fileVersion>
    <recordTime>2021-01-01T00:00:00.000000+00:00</recordTime>
</fileInfo>"#;

    fn write_mff(events_xml: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("info.xml"), INFO_XML).unwrap();
        fs::write(dir.path().join("Events_Test.xml"), events_xml).unwrap();
        dir
    }

    fn events_file(events: &[(&str, &str, &str)]) -> String {
        let mut body = String::from(
            "<?xml version=\"1.0\"?>\n<eventTrack xmlns=\"http://www.egi.com/event_mff\">\n\
             <name>Test</name>\n<trackType>EVNT</trackType>\n",
        );
        for (begin, code, duration) in events {
            body.push_str(&format!(
                "<event><beginTime>{}</beginTime><duration>{}</duration><code>{}</code></event>\n",
                begin, duration, code
            ));
        }
        body.push_str("</eventTrack>\n");
        body
    }

    #[test]
    fn test_single_event_sample_alignment() {
        let xml = events_file(&[("2021-01-01T00:00:01.500000+00:00", "STIM", "1000")]);
        let dir = write_mff(&xml);

        let (table, codes) =
            read_mff_events(dir.path(), 1000.0, &DecoderConfig::new()).unwrap();
        assert_eq!(codes, vec!["STIM".to_string()]);
        assert_eq!(table["STIM"], vec![1500]);
    }

    #[test]
    fn test_codes_register_first_seen() {
        let xml = events_file(&[
            ("2021-01-01T00:00:00.100000+00:00", "STIM", "0"),
            ("2021-01-01T00:00:00.200000+00:00", "RESP", "0"),
            ("2021-01-01T00:00:00.300000+00:00", "STIM", "0"),
        ]);
        let dir = write_mff(&xml);

        let (table, codes) =
            read_mff_events(dir.path(), 1000.0, &DecoderConfig::new()).unwrap();
        assert_eq!(codes, vec!["STIM".to_string(), "RESP".to_string()]);
        assert_eq!(table["STIM"], vec![100, 300]);
        assert_eq!(table["RESP"], vec![200]);
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let xml = events_file(&[("2021-01-01T00:00:01.500000+00:00", "STIM", "1000")]);
        let dir = write_mff(&xml);

        let parallel = read_mff_events(dir.path(), 1000.0, &DecoderConfig::new()).unwrap();
        let sequential = read_mff_events(
            dir.path(),
            1000.0,
            &DecoderConfig::new().with_parallel_flatten(false),
        )
        .unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_missing_info_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("Events_Test.xml"),
            events_file(&[("2021-01-01T00:00:01.000000+00:00", "STIM", "0")]),
        )
        .unwrap();

        let result = read_mff_events(dir.path(), 1000.0, &DecoderConfig::new());
        assert!(matches!(result, Err(EventError::MalformedInput(_))));
    }

    #[test]
    fn test_missing_record_time() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("info.xml"),
            "<?xml version=\"1.0\"?>\n<fileInfo><fileVersion>3</fileVersion></fileInfo>",
        )
        .unwrap();
        fs::write(
            dir.path().join("Events_Test.xml"),
            events_file(&[("2021-01-01T00:00:01.000000+00:00", "STIM", "0")]),
        )
        .unwrap();

        let result = read_mff_events(dir.path(), 1000.0, &DecoderConfig::new());
        assert!(matches!(result, Err(EventError::MalformedInput(_))));
    }

    #[test]
    fn test_event_missing_code_field() {
        let xml = "<?xml version=\"1.0\"?>\n<eventTrack>\n<name>T</name><trackType>EVNT</trackType>\n\
                   <event><beginTime>2021-01-01T00:00:01.000000+00:00</beginTime><duration>0</duration></event>\n\
                   </eventTrack>";
        let dir = write_mff(xml);

        let result = read_mff_events(dir.path(), 1000.0, &DecoderConfig::new());
        assert!(matches!(result, Err(EventError::MalformedInput(_))));
    }

    #[test]
    fn test_matrix_projection() {
        let xml = events_file(&[
            ("2021-01-01T00:00:00.100000+00:00", "STIM", "0"),
            ("2021-01-01T00:00:00.200000+00:00", "RESP", "0"),
        ]);
        let dir = write_mff(&xml);

        let info = RecordingInfo::new(1000.0, vec![5000], 1);
        let (matrix, updated) =
            read_events(dir.path(), &info, &DecoderConfig::new()).unwrap();

        assert_eq!(matrix.shape(), (2, 5000));
        assert_eq!(matrix.get(0, 100), 1.0);
        assert_eq!(matrix.get(1, 200), 2.0);
        assert_eq!(matrix.get(0, 101), 0.0);
        assert_eq!(updated.n_events, 2);
        assert_eq!(updated.event_codes, vec!["STIM".to_string(), "RESP".to_string()]);
        // the input header stays untouched
        assert_eq!(info.n_events, 0);
    }

    #[test]
    fn test_out_of_range_sample_strict() {
        let xml = events_file(&[("2021-01-01T00:01:00.000000+00:00", "LATE", "0")]);
        let dir = write_mff(&xml);

        let info = RecordingInfo::new(1000.0, vec![5000], 1);
        let result = read_events(dir.path(), &info, &DecoderConfig::new());
        assert!(matches!(
            result,
            Err(EventError::SampleOutOfRange { sample: 60_000, cols: 5000, .. })
        ));
    }

    #[test]
    fn test_out_of_range_sample_lenient() {
        let xml = events_file(&[
            ("2021-01-01T00:00:01.000000+00:00", "STIM", "0"),
            ("2021-01-01T00:01:00.000000+00:00", "STIM", "0"),
        ]);
        let dir = write_mff(&xml);

        let info = RecordingInfo::new(1000.0, vec![5000], 1);
        let config = DecoderConfig::new().with_strict_bounds(false);
        let (matrix, updated) = read_events(dir.path(), &info, &config).unwrap();
        assert_eq!(matrix.get(0, 1000), 1.0);
        assert_eq!(updated.n_events, 1);
    }

    #[test]
    fn test_event_before_recording_start() {
        let xml = events_file(&[("2020-12-31T23:59:59.000000+00:00", "EARLY", "0")]);
        let dir = write_mff(&xml);

        let (table, _) = read_mff_events(dir.path(), 1000.0, &DecoderConfig::new()).unwrap();
        // negative offsets truncate toward zero and only fail at projection
        assert_eq!(table["EARLY"], vec![-1000]);

        let info = RecordingInfo::new(1000.0, vec![5000], 1);
        let result = read_events(dir.path(), &info, &DecoderConfig::new());
        assert!(matches!(result, Err(EventError::SampleOutOfRange { .. })));
    }
}
