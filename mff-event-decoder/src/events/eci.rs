//! Typed extraction of ECI event files
//!
//! Events recorded through the Experiment Control Interface (usually driven by
//! E-Prime) live in `Events_ECI*.xml` under a single known namespace. Unlike
//! the legacy path this parser is schema-aware: every child tag of an `event`
//! element is converted through a closed table, and anything outside that table
//! fails the parse. The format is intentionally not extensible, so a miss means
//! the file is not what this parser was written for.

use crate::timestamp::parse_eci_timestamp;
use crate::types::{EciEvent, EventError, EventValue, KeyValue, Result};
use crate::xml::{strip_namespace, XmlElement};
use indexmap::IndexMap;
use std::path::Path;

/// Namespace of ECI event-track documents
const ECI_NAMESPACE: &str = "http://www.egi.com/event_mff";

/// Parse one ECI event file into typed event records in document order
pub fn parse_eci_events(path: &Path) -> Result<Vec<EciEvent>> {
    log::info!("Parsing ECI event file: {:?}", path);

    let root = XmlElement::from_path(path)?;
    let event_tag = namespaced("event");

    let mut events = Vec::new();
    for element in root.children.iter().filter(|child| child.tag == event_tag) {
        events.push(parse_event(element)?);
    }

    log::info!("Parsed {} ECI events from {:?}", events.len(), path);
    Ok(events)
}

/// Convert one `event` element through the closed per-tag table
fn parse_event(event: &XmlElement) -> Result<EciEvent> {
    let mut fields = IndexMap::new();
    for child in &event.children {
        let tag = strip_namespace(&child.tag);
        let value = convert_field(tag, child)?;
        fields.insert(tag.to_string(), value);
    }
    Ok(EciEvent { fields })
}

/// The per-tag conversion table. Closed by design: an event child tag that is
/// not listed here fails the parse.
fn convert_field(tag: &str, element: &XmlElement) -> Result<EventValue> {
    match tag {
        "beginTime" => {
            let raw = required_text(element, tag)?;
            Ok(EventValue::Timestamp(parse_eci_timestamp(raw)?))
        }
        "duration" | "relativeBeginTime" => Ok(EventValue::Integer(integer_text(element, tag)?)),
        "segmentationEvent" => Ok(EventValue::Boolean(
            element.text.as_deref() == Some("true"),
        )),
        "code" | "label" | "description" | "sourceDevice" => Ok(EventValue::Text(
            element.text.clone().unwrap_or_default(),
        )),
        "keys" => Ok(EventValue::Keys(parse_keys(element)?)),
        other => Err(EventError::UnknownSchemaElement(format!(
            "event field '{}'",
            other
        ))),
    }
}

/// Convert the `key` children of a `keys` element into a typed payload.
///
/// Each key carries a `keyCode` and a `data` element whose `dataType`
/// attribute selects the scalar width. Unknown `dataType` values fail the same
/// way unknown tags do.
fn parse_keys(keys: &XmlElement) -> Result<IndexMap<String, KeyValue>> {
    let key_tag = namespaced("key");
    let code_tag = namespaced("keyCode");
    let data_tag = namespaced("data");

    let mut payload = IndexMap::new();
    for key in keys.children.iter().filter(|child| child.tag == key_tag) {
        let code = key
            .children
            .iter()
            .find(|child| child.tag == code_tag)
            .and_then(|child| child.text.clone())
            .ok_or_else(|| {
                EventError::MalformedInput("key element has no keyCode".to_string())
            })?;

        let data = key
            .children
            .iter()
            .find(|child| child.tag == data_tag)
            .ok_or_else(|| {
                EventError::MalformedInput(format!("key '{}' has no data element", code))
            })?;

        let data_type = data.attr("dataType").ok_or_else(|| {
            EventError::MalformedInput(format!("key '{}' data has no dataType", code))
        })?;
        let raw = data.text.as_deref().unwrap_or("");

        let value = match data_type {
            "short" => KeyValue::Short(parse_number(raw, &code)?),
            "long" => KeyValue::Long(parse_number(raw, &code)?),
            "string" | "TEXT" => KeyValue::Text(raw.to_string()),
            other => {
                return Err(EventError::UnknownSchemaElement(format!(
                    "key dataType '{}'",
                    other
                )))
            }
        };
        payload.insert(code, value);
    }
    Ok(payload)
}

fn namespaced(local: &str) -> String {
    format!("{{{}}}{}", ECI_NAMESPACE, local)
}

fn required_text<'a>(element: &'a XmlElement, tag: &str) -> Result<&'a str> {
    element.text.as_deref().ok_or_else(|| {
        EventError::MalformedInput(format!("event field '{}' has no text", tag))
    })
}

fn integer_text(element: &XmlElement, tag: &str) -> Result<i64> {
    let raw = required_text(element, tag)?;
    raw.trim().parse().map_err(|_| {
        EventError::MalformedInput(format!("event field '{}' is not an integer: '{}'", tag, raw))
    })
}

fn parse_number<T: std::str::FromStr>(raw: &str, code: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        EventError::MalformedInput(format!("key '{}' has a non-numeric value '{}'", code, raw))
    })
}
