//! Structured export of a tree.
//!
//! Each node maps to an [`ElementRecord`], which serializes as
//! `{"tagName": .., "attributes": {..}, "children": [..]}` with `children`
//! left out for leaves.
//!
//! The JSON functions stream that shape straight from the tree with an
//! explicit stack, so they accept documents of any depth. [`to_record`]
//! builds owned nested values, which are dropped and serialized
//! recursively; it refuses subtrees deeper than [`MAX_RECORD_DEPTH`].

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::render::write_padding;
use crate::{AttributesMap, DOCUMENT_TAG_NAME, DomTree, NodeId, NodeType};

/// Tag name used for records that stand for text nodes.
pub const TEXT_RECORD_TAG: &str = "#text";

/// Serializable mirror of one node and its subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementRecord {
    /// Tag name, [`DOCUMENT_TAG_NAME`] for the root or [`TEXT_RECORD_TAG`] for text.
    pub tag_name: String,
    /// Element attributes; empty for the root and text.
    pub attributes: AttributesMap,
    /// Character data of a text node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Child records in document order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementRecord>,
}

/// Deepest nesting, counted from the starting node, that [`to_record`] will build.
pub const MAX_RECORD_DEPTH: usize = 512;

/// Errors from structured export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The requested node is not part of the tree.
    #[error("node {0:?} does not exist in this tree")]
    UnknownNode(NodeId),
    /// The subtree nests deeper than a record may.
    #[error("node {node:?} is nested more than {limit} levels deep")]
    TooDeep {
        /// First node found beyond the limit.
        node: NodeId,
        /// The limit that was exceeded.
        limit: usize,
    },
    /// The destination could not be written.
    #[error("failed to write export: {0}")]
    Io(#[from] io::Error),
    /// Serialization failed.
    #[error("failed to serialize tree: {0}")]
    Json(#[from] serde_json::Error),
}

/// A record for one node, without its children.
fn shallow_record(node_type: &NodeType) -> ElementRecord {
    let (tag_name, attributes, text) = match node_type {
        NodeType::Document => (DOCUMENT_TAG_NAME.to_string(), AttributesMap::new(), None),
        NodeType::Element(data) => (data.tag_name.clone(), data.attrs.clone(), None),
        NodeType::Text(data) => (
            TEXT_RECORD_TAG.to_string(),
            AttributesMap::new(),
            Some(data.clone()),
        ),
    };
    ElementRecord {
        tag_name,
        attributes,
        text,
        children: Vec::new(),
    }
}

/// Convert the subtree at `id` into a record.
///
/// Records are built bottom-up with an explicit stack of open ancestors.
///
/// # Errors
///
/// Fails with [`ExportError::UnknownNode`] if `id` is not in the tree, or
/// [`ExportError::TooDeep`] if the subtree nests more than
/// [`MAX_RECORD_DEPTH`] levels below `id`.
pub fn to_record(tree: &DomTree, id: NodeId) -> Result<ElementRecord, ExportError> {
    let node = tree.get(id).ok_or(ExportError::UnknownNode(id))?;
    let mut current = (shallow_record(&node.node_type), node.children.iter());
    let mut ancestors = Vec::new();

    loop {
        if let Some(&child) = current.1.next() {
            let Some(child_node) = tree.get(child) else {
                continue;
            };
            if ancestors.len() >= MAX_RECORD_DEPTH {
                return Err(ExportError::TooDeep {
                    node: child,
                    limit: MAX_RECORD_DEPTH,
                });
            }
            let entered = (shallow_record(&child_node.node_type), child_node.children.iter());
            ancestors.push(std::mem::replace(&mut current, entered));
        } else {
            let Some(parent) = ancestors.pop() else {
                return Ok(current.0);
            };
            let (finished, _) = std::mem::replace(&mut current, parent);
            current.0.children.push(finished);
        }
    }
}

/// One step of the JSON walk.
enum Step {
    /// Write a node; `first` is false when a comma must precede it.
    Open {
        id: NodeId,
        level: usize,
        first: bool,
    },
    /// Close the `children` array and the object at `level`.
    Close { level: usize },
}

/// Emits the [`ElementRecord`] JSON shape token by token.
///
/// Pretty output matches `serde_json`'s pretty printer: two spaces per level
/// and `": "` between keys and values.
struct JsonWriter<'a, W> {
    sink: &'a mut W,
    pretty: bool,
}

impl<W: Write> JsonWriter<'_, W> {
    fn raw(&mut self, bytes: &[u8]) -> Result<(), ExportError> {
        self.sink.write_all(bytes)?;
        Ok(())
    }

    fn newline(&mut self, level: usize) -> Result<(), ExportError> {
        if self.pretty {
            self.raw(b"\n")?;
            write_padding(&mut *self.sink, level * 2)?;
        }
        Ok(())
    }

    fn string(&mut self, value: &str) -> Result<(), ExportError> {
        serde_json::to_writer(&mut *self.sink, value)?;
        Ok(())
    }

    fn key(&mut self, level: usize, name: &str, first: bool) -> Result<(), ExportError> {
        if !first {
            self.raw(b",")?;
        }
        self.newline(level)?;
        self.string(name)?;
        let separator: &[u8] = if self.pretty { b": " } else { b":" };
        self.raw(separator)
    }

    fn attributes(&mut self, attrs: &AttributesMap, level: usize) -> Result<(), ExportError> {
        if attrs.is_empty() {
            return self.raw(b"{}");
        }
        self.raw(b"{")?;
        for (i, (name, value)) in attrs.iter().enumerate() {
            self.key(level + 1, name, i == 0)?;
            self.string(value)?;
        }
        self.newline(level)?;
        self.raw(b"}")
    }

    /// Write `{`, the tag name, attributes and text of a node, leaving the
    /// object open.
    fn fields(&mut self, node_type: &NodeType, level: usize) -> Result<(), ExportError> {
        let empty = AttributesMap::new();
        let (tag_name, attrs, text) = match node_type {
            NodeType::Document => (DOCUMENT_TAG_NAME, &empty, None),
            NodeType::Element(data) => (data.tag_name.as_str(), &data.attrs, None),
            NodeType::Text(data) => (TEXT_RECORD_TAG, &empty, Some(data.as_str())),
        };
        self.raw(b"{")?;
        self.key(level + 1, "tagName", true)?;
        self.string(tag_name)?;
        self.key(level + 1, "attributes", false)?;
        self.attributes(attrs, level + 1)?;
        if let Some(text) = text {
            self.key(level + 1, "text", false)?;
            self.string(text)?;
        }
        Ok(())
    }
}

/// Write the subtree at `id` to `sink` as JSON, compact or indented.
///
/// The output is the serialization of [`to_record`]'s result, but it is
/// produced with an explicit stack and has no depth limit.
///
/// # Errors
///
/// Fails if `id` is unknown or `sink` cannot be written.
pub fn write_json<W: Write>(
    tree: &DomTree,
    id: NodeId,
    sink: &mut W,
    pretty: bool,
) -> Result<(), ExportError> {
    if !tree.contains(id) {
        return Err(ExportError::UnknownNode(id));
    }
    let mut out = JsonWriter { sink, pretty };
    let mut stack = vec![Step::Open {
        id,
        level: 0,
        first: true,
    }];

    while let Some(step) = stack.pop() {
        match step {
            Step::Open { id, level, first } => {
                let Some(node) = tree.get(id) else {
                    continue;
                };
                if !first {
                    out.raw(b",")?;
                }
                // The outermost object starts at the beginning of the output.
                if level > 0 {
                    out.newline(level)?;
                }
                out.fields(&node.node_type, level)?;
                if node.children.is_empty() {
                    out.newline(level)?;
                    out.raw(b"}")?;
                    continue;
                }
                out.key(level + 1, "children", false)?;
                out.raw(b"[")?;
                stack.push(Step::Close { level });
                stack.extend(node.children.iter().enumerate().rev().map(|(i, &child)| {
                    Step::Open {
                        id: child,
                        level: level + 2,
                        first: i == 0,
                    }
                }));
            }
            Step::Close { level } => {
                out.newline(level + 1)?;
                out.raw(b"]")?;
                out.newline(level)?;
                out.raw(b"}")?;
            }
        }
    }
    Ok(())
}

fn json_string(tree: &DomTree, id: NodeId, pretty: bool) -> Result<String, ExportError> {
    let mut out = Vec::new();
    write_json(tree, id, &mut out, pretty)?;
    String::from_utf8(out)
        .map_err(|e| ExportError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Serialize the subtree at `id` as compact JSON.
///
/// # Errors
///
/// Fails if `id` is unknown.
pub fn to_json(tree: &DomTree, id: NodeId) -> Result<String, ExportError> {
    json_string(tree, id, false)
}

/// Serialize the subtree at `id` as indented JSON.
///
/// # Errors
///
/// Fails if `id` is unknown.
pub fn to_json_pretty(tree: &DomTree, id: NodeId) -> Result<String, ExportError> {
    json_string(tree, id, true)
}

/// Write the subtree at `id` to a file as indented JSON.
///
/// # Errors
///
/// Fails if `id` is unknown or the file cannot be created or written.
pub fn write_json_to_file(
    tree: &DomTree,
    id: NodeId,
    path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    if !tree.contains(id) {
        return Err(ExportError::UnknownNode(id));
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_json(tree, id, &mut writer, true)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
