//! Plain-text tree dump.
//!
//! One line per node in pre-order, indented four spaces per level:
//!
//! ```text
//! document
//!     a (href="x", class="y z")
//!         "link"
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::{DOCUMENT_TAG_NAME, DomTree, NodeId, NodeType};

/// Spaces per nesting level.
const INDENT_WIDTH: usize = 4;

/// Blank run copied out in chunks when indenting deeply nested lines.
static PADDING: [u8; 1024] = [b' '; 1024];

/// Write `width` spaces to `sink`.
pub(crate) fn write_padding<W: Write>(sink: &mut W, width: usize) -> io::Result<()> {
    let mut remaining = width;
    while remaining > 0 {
        let chunk = remaining.min(PADDING.len());
        sink.write_all(&PADDING[..chunk])?;
        remaining -= chunk;
    }
    Ok(())
}

/// Format a single node, without indentation or newline.
fn node_line(node_type: &NodeType) -> String {
    match node_type {
        NodeType::Document => DOCUMENT_TAG_NAME.to_string(),
        NodeType::Element(data) if data.attrs.is_empty() => data.tag_name.clone(),
        NodeType::Element(data) => {
            let attrs: Vec<String> = data
                .attrs
                .iter()
                .map(|(k, v)| format!("{k}=\"{v}\""))
                .collect();
            format!("{} ({})", data.tag_name, attrs.join(", "))
        }
        NodeType::Text(data) => format!("\"{}\"", data.replace('\n', "\\n")),
    }
}

/// Write the subtree at `id` to `sink`, one line per node.
///
/// The walk keeps its own stack, so nesting depth is bounded by memory only.
///
/// # Errors
///
/// Propagates any write error from `sink`.
pub fn write_tree<W: Write>(tree: &DomTree, id: NodeId, sink: &mut W) -> io::Result<()> {
    let mut stack = vec![(id, 0)];
    while let Some((id, depth)) = stack.pop() {
        let Some(node) = tree.get(id) else {
            continue;
        };
        write_padding(sink, depth * INDENT_WIDTH)?;
        writeln!(sink, "{}", node_line(&node.node_type))?;
        stack.extend(node.children.iter().rev().map(|&child| (child, depth + 1)));
    }
    Ok(())
}

/// Render the subtree at `id` into a string, one line per node.
#[must_use]
pub fn tree_to_string(tree: &DomTree, id: NodeId) -> String {
    let mut out = Vec::new();
    // Writing into a Vec never fails.
    let _ = write_tree(tree, id, &mut out);
    String::from_utf8_lossy(&out).into_owned()
}

/// Print the subtree at `id` to standard output.
///
/// # Errors
///
/// Fails if standard output cannot be written.
pub fn print_tree(tree: &DomTree, id: NodeId) -> io::Result<()> {
    let mut lock = io::stdout().lock();
    write_tree(tree, id, &mut lock)
}

/// Write the subtree at `id` to a file, creating or truncating it.
///
/// # Errors
///
/// Fails if the file cannot be created or written.
pub fn write_tree_to_file(tree: &DomTree, id: NodeId, path: impl AsRef<Path>) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_tree(tree, id, &mut writer)?;
    writer.flush()
}
