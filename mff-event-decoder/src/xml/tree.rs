//! Owned XML element tree built on quick-xml
//!
//! The event-log files are small, so each one is loaded into an owned tree
//! before interpretation. Element names are resolved against their namespace
//! and stored in Clark notation (`{uri}local`) so the flattener and the typed
//! parser can strip or match namespaces uniformly. Attribute keys keep their
//! raw spelling; namespace declarations themselves are not attributes.

use crate::types::{EventError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One element of a parsed XML document
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    /// Element name, in Clark notation when the element is namespaced
    pub tag: String,
    /// Attributes in document order, excluding namespace declarations
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order
    pub children: Vec<XmlElement>,
    /// Character data directly inside this element, `None` when absent
    pub text: Option<String>,
}

impl XmlElement {
    /// Parse a whole XML file into an element tree rooted at the document element.
    ///
    /// The file handle lives only for the duration of this call.
    pub fn from_path(path: &Path) -> Result<XmlElement> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Self::from_reader(reader, &path.to_string_lossy())
    }

    /// Parse an XML document from any buffered reader.
    ///
    /// `origin` names the source in error messages.
    pub fn from_reader<R: BufRead>(input: R, origin: &str) -> Result<XmlElement> {
        let mut reader = NsReader::from_reader(input);
        let mut buf = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            buf.clear();
            let (resolve, event) = reader
                .read_resolved_event_into(&mut buf)
                .map_err(|e| parse_error(origin, &e.to_string()))?;

            match event {
                Event::Start(ref e) => {
                    let element = element_from_start(&resolve, e, origin)?;
                    stack.push(element);
                }
                Event::Empty(ref e) => {
                    let element = element_from_start(&resolve, e, origin)?;
                    attach(&mut stack, &mut root, element, origin)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| parse_error(origin, "unbalanced closing tag"))?;
                    attach(&mut stack, &mut root, element, origin)?;
                }
                Event::Text(ref t) => {
                    let text = t
                        .unescape()
                        .map_err(|e| parse_error(origin, &e.to_string()))?;
                    if let Some(open) = stack.last_mut() {
                        open.push_text(&text);
                    }
                }
                Event::CData(ref t) => {
                    let text = String::from_utf8_lossy(t);
                    if let Some(open) = stack.last_mut() {
                        open.push_text(&text);
                    }
                }
                Event::Eof => break,
                // Declarations, comments and processing instructions carry no data we keep
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(parse_error(origin, "document ended inside an open element"));
        }
        root.ok_or_else(|| parse_error(origin, "document has no root element"))
    }

    /// Look up an attribute by its raw key
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// True when this element has child elements
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    fn push_text(&mut self, chunk: &str) {
        match &mut self.text {
            Some(existing) => existing.push_str(chunk),
            None => self.text = Some(chunk.to_string()),
        }
    }
}

/// Build an element shell from a start or empty tag
fn element_from_start(
    resolve: &ResolveResult,
    start: &BytesStart<'_>,
    origin: &str,
) -> Result<XmlElement> {
    let local = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let tag = match resolve {
        ResolveResult::Bound(ns) => {
            format!("{{{}}}{}", String::from_utf8_lossy(ns.0), local)
        }
        ResolveResult::Unbound => local,
        ResolveResult::Unknown(prefix) => {
            return Err(parse_error(
                origin,
                &format!(
                    "unbound namespace prefix '{}'",
                    String::from_utf8_lossy(prefix)
                ),
            ));
        }
    };

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| parse_error(origin, &e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        // xmlns declarations define scope, they are not element data
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let value = attr
            .unescape_value()
            .map_err(|e| parse_error(origin, &e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(XmlElement {
        tag,
        attributes,
        children: Vec::new(),
        text: None,
    })
}

/// Hand a completed element to its parent, or make it the document root
fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
    origin: &str,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        Ok(())
    } else if root.is_none() {
        *root = Some(element);
        Ok(())
    } else {
        Err(parse_error(origin, "multiple root elements"))
    }
}

fn parse_error(origin: &str, message: &str) -> EventError {
    EventError::XmlParse {
        path: origin.to_string(),
        message: message.to_string(),
    }
}
