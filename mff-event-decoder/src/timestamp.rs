//! Vendor timestamp parsing
//!
//! The acquisition software writes wall-clock timestamps in two variants. The
//! legacy variant is fixed-width with the UTC offset ignored; the ECI variant
//! keeps its offset but separates the offset hours and minutes with a colon,
//! which the `%z` specifier does not accept, so that one colon is removed
//! before parsing.

use crate::types::{EciTimestamp, EventError, MffTimestamp, Result};
use chrono::{DateTime, NaiveDateTime};

/// Parse a legacy event-log timestamp such as
/// `2021-01-01 00:00:01.500000+01:00` into a naive wall-clock time.
///
/// The layout is fixed-width: bytes `[0..10]` hold the date and bytes
/// `[11..26]` the time with microseconds. Anything past byte 26, including a
/// UTC offset, is ignored; event and record times in one recording share the
/// same offset, so relative arithmetic stays correct without it.
pub fn parse_mff_timestamp(raw: &str) -> Result<MffTimestamp> {
    let date = raw
        .get(0..10)
        .ok_or_else(|| malformed(raw, "shorter than the fixed date field"))?;
    let time = raw
        .get(11..26)
        .ok_or_else(|| malformed(raw, "shorter than the fixed time field"))?;

    let combined = format!("{} {}", date, time);
    NaiveDateTime::parse_from_str(&combined, "%Y-%m-%d %H:%M:%S%.f")
        .map_err(|e| malformed(raw, &e.to_string()))
}

/// Parse an ECI timestamp such as `2021-12-11T11:50:58.962555+08:00` into an
/// offset-aware time.
///
/// The colon nearest the end of the string separates the offset hours from the
/// offset minutes and is removed; colons inside the time of day are untouched.
pub fn parse_eci_timestamp(raw: &str) -> Result<EciTimestamp> {
    let cleaned = match raw.rfind(':') {
        Some(pos) => {
            let mut s = String::with_capacity(raw.len() - 1);
            s.push_str(&raw[..pos]);
            s.push_str(&raw[pos + 1..]);
            s
        }
        None => raw.to_string(),
    };

    DateTime::parse_from_str(&cleaned, "%Y-%m-%dT%H:%M:%S%.f%z")
        .map_err(|e| malformed(raw, &e.to_string()))
}

fn malformed(raw: &str, reason: &str) -> EventError {
    EventError::MalformedTimestamp(format!("'{}': {}", raw, reason))
}
