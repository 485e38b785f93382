//! Schema-free flattening of vendor event-log XML
//!
//! The acquisition software writes several XML layouts that share no schema.
//! Rather than modeling each one, the flattener converts any element tree into
//! a recursive [`Node`] value using a shape heuristic: siblings with matching
//! tags become a sequence, heterogeneous siblings become a mapping. The
//! heuristic is tailored to the shapes this vendor actually produces and is
//! deliberately not a general XML data binding.

use crate::types::Result;
use crate::xml::tree::XmlElement;
use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;

/// Flattened form of one XML subtree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    /// Character data of a leaf element
    Scalar(String),
    /// Leaf element that carried no text at all
    Empty,
    /// Heterogeneous children and attributes, keyed by stripped tag or raw
    /// attribute name, in document order
    Map(IndexMap<String, Node>),
    /// Homogeneous repeated children, in document order
    List(Vec<Node>),
}

impl Node {
    /// Look up an entry by key if this node is a mapping
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// True if this node is a mapping containing `key`
    pub fn contains_key(&self, key: &str) -> bool {
        matches!(self, Node::Map(map) if map.contains_key(key))
    }

    /// Borrow the text if this node is a scalar
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Borrow the entries if this node is a sequence
    pub fn as_list(&self) -> Option<&[Node]> {
        match self {
            Node::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Borrow the entries if this node is a mapping
    pub fn as_map(&self) -> Option<&IndexMap<String, Node>> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }
}

/// Remove a Clark-notation namespace wrapper from a tag name.
///
/// Everything up to and including the first `}` is dropped; a tag without `}`
/// is returned unchanged. Pure and total.
pub fn strip_namespace(tag: &str) -> &str {
    match tag.find('}') {
        Some(pos) => &tag[pos + 1..],
        None => tag,
    }
}

/// Flatten a whole file into the sequence form of its root's children.
///
/// This is the entry point the legacy extractor uses for every discovered
/// XML file.
pub fn flatten_file(path: &Path) -> Result<Node> {
    let root = XmlElement::from_path(path)?;
    Ok(flatten_children(&root))
}

/// Flatten an element's children as an ordered sequence.
///
/// Per child: with grandchildren present, compare the first and last grandchild
/// tags to choose between the mapping and the sequence form. A single grandchild
/// compares equal to itself and therefore flattens as a sequence of one; the
/// vendor files rely on that shape, so it must stay. Childless children keep
/// their trimmed text as a one-entry mapping, or vanish when the text is blank.
pub fn flatten_children(root: &XmlElement) -> Node {
    let mut output = Vec::new();

    for child in &root.children {
        if child.has_children() {
            let first = child.children.first().map(|c| c.tag.as_str());
            let last = child.children.last().map(|c| c.tag.as_str());
            if first != last {
                output.push(flatten_element(child));
            } else {
                output.push(flatten_children(child));
            }
        } else if let Some(text) = child.text.as_deref() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                let mut entry = IndexMap::new();
                entry.insert(
                    strip_namespace(&child.tag).to_string(),
                    Node::Scalar(trimmed.to_string()),
                );
                output.push(Node::Map(entry));
            }
        }
    }

    Node::List(output)
}

/// Flatten an element as a mapping.
///
/// The element's own attributes come first. Per child: with grandchildren, a
/// single grandchild or two leading grandchildren with different tags selects
/// the mapping form, otherwise the repeated grandchildren flatten as a sequence
/// keyed under the first grandchild's stripped tag; the child's attributes merge
/// into the result either way. Childless children contribute their attributes,
/// or their raw text when they have none. Later entries overwrite earlier ones
/// on duplicate keys.
pub fn flatten_element(root: &XmlElement) -> Node {
    let mut output: IndexMap<String, Node> = IndexMap::new();

    for (key, value) in &root.attributes {
        output.insert(key.clone(), Node::Scalar(value.clone()));
    }

    for child in &root.children {
        if child.has_children() {
            let mut entry =
                if child.children.len() == 1 || child.children[0].tag != child.children[1].tag {
                    flatten_element(child)
                } else {
                    let mut keyed = IndexMap::new();
                    keyed.insert(
                        strip_namespace(&child.children[0].tag).to_string(),
                        flatten_children(child),
                    );
                    Node::Map(keyed)
                };

            if let Node::Map(map) = &mut entry {
                for (key, value) in &child.attributes {
                    map.insert(key.clone(), Node::Scalar(value.clone()));
                }
            }

            output.insert(strip_namespace(&child.tag).to_string(), entry);
        } else if !child.attributes.is_empty() {
            let mut attrs = IndexMap::new();
            for (key, value) in &child.attributes {
                attrs.insert(key.clone(), Node::Scalar(value.clone()));
            }
            output.insert(strip_namespace(&child.tag).to_string(), Node::Map(attrs));
        } else {
            let value = match &child.text {
                Some(text) => Node::Scalar(text.clone()),
                None => Node::Empty,
            };
            output.insert(strip_namespace(&child.tag).to_string(), value);
        }
    }

    Node::Map(output)
}
