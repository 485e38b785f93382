//! End-to-end extraction tests over synthetic MFF directories
//!
//! These tests write small recording directories to disk and run the whole
//! pipeline through the public decoder API, the way the surrounding MFF
//! reader would.

use mff_event_decoder::{
    combine_triggers, DecoderConfig, EventDecoder, EventError, KeyValue, RecordingInfo,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_info(dir: &Path, record_time: &str) {
    let content = format!(
        "<?xml version=\"1.0\"?>\n\
         <fileInfo xmlns=\"http://www.egi.com/info_mff\">\n\
           <fileVersion>3</fileVersion>\n\
           <recordTime>{}</recordTime>\n\
         </fileInfo>\n",
        record_time
    );
    fs::write(dir.join("info.xml"), content).unwrap();
}

fn write_event_track(dir: &Path, filename: &str, events: &[(&str, &str, &str)]) {
    let mut content = String::from(
        "<?xml version=\"1.0\"?>\n\
         <eventTrack xmlns=\"http://www.egi.com/event_mff\">\n\
           <name>Test</name>\n\
           <trackType>EVNT</trackType>\n",
    );
    for (begin, code, duration) in events {
        content.push_str(&format!(
            "  <event>\n    <beginTime>{}</beginTime>\n    <duration>{}</duration>\n    <code>{}</code>\n  </event>\n",
            begin, duration, code
        ));
    }
    content.push_str("</eventTrack>\n");
    fs::write(dir.join(filename), content).unwrap();
}

#[test]
fn stim_event_lands_on_sample_1500() {
    let dir = TempDir::new().unwrap();
    write_info(dir.path(), "2021-01-01T00:00:00.000000+00:00");
    write_event_track(
        dir.path(),
        "Events_Test.xml",
        &[("2021-01-01T00:00:01.500000+00:00", "STIM", "1000000")],
    );

    let decoder = EventDecoder::new();
    let (table, codes) = decoder.read_mff_events(dir.path(), 1000.0).unwrap();

    assert_eq!(codes, vec!["STIM".to_string()]);
    assert_eq!(table["STIM"], vec![1500]);
}

#[test]
fn matrix_rows_carry_one_based_code_values() {
    let dir = TempDir::new().unwrap();
    write_info(dir.path(), "2021-01-01T00:00:00.000000+00:00");
    write_event_track(
        dir.path(),
        "Events_Test.xml",
        &[
            ("2021-01-01T00:00:00.250000+00:00", "STIM", "0"),
            ("2021-01-01T00:00:01.000000+00:00", "RESP", "0"),
            ("2021-01-01T00:00:02.000000+00:00", "STIM", "0"),
        ],
    );

    let decoder = EventDecoder::new();
    let info = RecordingInfo::new(1000.0, vec![5000], 1);
    let (matrix, updated) = decoder.read_events(dir.path(), &info).unwrap();

    assert_eq!(matrix.shape(), (2, 5000));
    assert_eq!(updated.n_events, 2);
    assert_eq!(
        updated.event_codes,
        vec!["STIM".to_string(), "RESP".to_string()]
    );
    // row 0 holds ones, row 1 holds twos
    assert_eq!(matrix.get(0, 250), 1.0);
    assert_eq!(matrix.get(0, 2000), 1.0);
    assert_eq!(matrix.get(1, 1000), 2.0);
    // everything else stays zero
    assert_eq!(matrix.row(0).iter().filter(|&&v| v != 0.0).count(), 2);
    assert_eq!(matrix.row(1).iter().filter(|&&v| v != 0.0).count(), 1);
    // original header is untouched
    assert_eq!(info.n_events, 0);
    assert!(info.event_codes.is_empty());
}

#[test]
fn segments_multiply_matrix_width() {
    let dir = TempDir::new().unwrap();
    write_info(dir.path(), "2021-01-01T00:00:00.000000+00:00");
    write_event_track(
        dir.path(),
        "Events_Test.xml",
        &[("2021-01-01T00:00:06.000000+00:00", "STIM", "0")],
    );

    let decoder = EventDecoder::new();
    let info = RecordingInfo::new(1000.0, vec![5000], 2);
    let (matrix, _) = decoder.read_events(dir.path(), &info).unwrap();

    // 6 s at 1000 Hz only fits because two segments widen the matrix
    assert_eq!(matrix.shape(), (1, 10_000));
    assert_eq!(matrix.get(0, 6000), 1.0);
}

#[test]
fn multiple_event_files_merge_in_stem_order() {
    let dir = TempDir::new().unwrap();
    write_info(dir.path(), "2021-01-01T00:00:00.000000+00:00");
    // written out of order on purpose; stems sort as DIN before User
    write_event_track(
        dir.path(),
        "Events_User.xml",
        &[("2021-01-01T00:00:02.000000+00:00", "USER", "0")],
    );
    write_event_track(
        dir.path(),
        "Events_DIN.xml",
        &[("2021-01-01T00:00:01.000000+00:00", "DIN1", "0")],
    );

    let decoder = EventDecoder::new();
    let (table, codes) = decoder.read_mff_events(dir.path(), 1000.0).unwrap();

    assert_eq!(codes, vec!["DIN1".to_string(), "USER".to_string()]);
    assert_eq!(table["DIN1"], vec![1000]);
    assert_eq!(table["USER"], vec![2000]);
}

#[test]
fn non_event_xml_files_are_ignored() {
    let dir = TempDir::new().unwrap();
    write_info(dir.path(), "2021-01-01T00:00:00.000000+00:00");
    write_event_track(
        dir.path(),
        "Events_Test.xml",
        &[("2021-01-01T00:00:01.000000+00:00", "STIM", "0")],
    );
    // sensorLayout-style sibling that must not contribute events
    fs::write(
        dir.path().join("sensorLayout.xml"),
        "<?xml version=\"1.0\"?>\n<sensorLayout><name>HydroCel</name></sensorLayout>\n",
    )
    .unwrap();

    let decoder = EventDecoder::new();
    let (_, codes) = decoder.read_mff_events(dir.path(), 1000.0).unwrap();
    assert_eq!(codes.len(), 1);
}

#[test]
fn out_of_range_event_is_reported_with_context() {
    let dir = TempDir::new().unwrap();
    write_info(dir.path(), "2021-01-01T00:00:00.000000+00:00");
    write_event_track(
        dir.path(),
        "Events_Test.xml",
        &[("2021-01-01T00:00:10.000000+00:00", "LATE", "0")],
    );

    let decoder = EventDecoder::new();
    let info = RecordingInfo::new(1000.0, vec![5000], 1);
    match decoder.read_events(dir.path(), &info) {
        Err(EventError::SampleOutOfRange { code, sample, cols }) => {
            assert_eq!(code, "LATE");
            assert_eq!(sample, 10_000);
            assert_eq!(cols, 5000);
        }
        other => panic!("expected SampleOutOfRange, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn missing_info_is_a_hard_error() {
    let dir = TempDir::new().unwrap();
    write_event_track(
        dir.path(),
        "Events_Test.xml",
        &[("2021-01-01T00:00:01.000000+00:00", "STIM", "0")],
    );

    let decoder = EventDecoder::new();
    assert!(matches!(
        decoder.read_mff_events(dir.path(), 1000.0),
        Err(EventError::MalformedInput(_))
    ));
}

#[test]
fn typed_eci_extraction_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Events_ECI.xml");
    fs::write(
        &path,
        "<?xml version=\"1.0\"?>\n\
         <eventTrack xmlns=\"http://www.egi.com/event_mff\">\n\
           <name>ECI TCP/IP</name>\n\
           <trackType>EVNT</trackType>\n\
           <event>\n\
             <beginTime>2021-12-11T11:50:58.962555+08:00</beginTime>\n\
             <duration>1000000000</duration>\n\
             <segmentationEvent>true</segmentationEvent>\n\
             <code>TRSP</code>\n\
             <keys>\n\
               <key><keyCode>cel#</keyCode><data dataType=\"short\">5</data></key>\n\
             </keys>\n\
           </event>\n\
         </eventTrack>\n",
    )
    .unwrap();

    let decoder = EventDecoder::new();
    let events = decoder.read_eci_events(&path).unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].duration_ns(), Some(1_000_000_000));
    assert!(events[0].get("segmentationEvent").unwrap().as_bool());
    let keys = events[0].get("keys").unwrap().as_keys().unwrap();
    assert_eq!(keys["cel#"], KeyValue::Short(5));
}

#[test]
fn trigger_channel_from_extracted_rows() {
    let dir = TempDir::new().unwrap();
    write_info(dir.path(), "2021-01-01T00:00:00.000000+00:00");
    write_event_track(
        dir.path(),
        "Events_Test.xml",
        &[
            ("2021-01-01T00:00:00.001000+00:00", "STIM", "0"),
            ("2021-01-01T00:00:00.002000+00:00", "RESP", "0"),
        ],
    );

    let decoder = EventDecoder::new();
    let info = RecordingInfo::new(1000.0, vec![4], 1);
    let (matrix, updated) = decoder.read_events(dir.path(), &info).unwrap();

    let rows: Vec<Vec<f64>> = (0..updated.n_events)
        .map(|row| {
            matrix
                .row(row)
                .iter()
                .map(|&v| if v != 0.0 { 1.0 } else { 0.0 })
                .collect()
        })
        .collect();

    let combined = combine_triggers(&rows, None).unwrap();
    assert_eq!(combined, vec![0.0, 1.0, 2.0, 0.0]);
}

#[test]
fn lenient_bounds_salvage_truncated_recording() {
    let dir = TempDir::new().unwrap();
    write_info(dir.path(), "2021-01-01T00:00:00.000000+00:00");
    write_event_track(
        dir.path(),
        "Events_Test.xml",
        &[
            ("2021-01-01T00:00:00.500000+00:00", "STIM", "0"),
            ("2021-01-01T00:00:09.000000+00:00", "STIM", "0"),
        ],
    );

    let decoder =
        EventDecoder::with_config(DecoderConfig::new().with_strict_bounds(false));
    let info = RecordingInfo::new(1000.0, vec![1000], 1);
    let (matrix, _) = decoder.read_events(dir.path(), &info).unwrap();

    assert_eq!(matrix.get(0, 500), 1.0);
    assert_eq!(matrix.row(0).iter().filter(|&&v| v != 0.0).count(), 1);
}
