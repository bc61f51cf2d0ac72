//! Element tree for the twig HTML scanner.
//!
//! # Design
//!
//! Every node lives in one arena and refers to its relatives through
//! [`NodeId`] indices. A parent owns the ordered list of its children; the
//! `parent` field is a plain back-index used for ascending while parsing and
//! for upward navigation, so the tree never holds a reference cycle.
//!
//! The arena slot at [`NodeId::ROOT`] is the synthetic document root. It has
//! no parent and answers to the reserved tag name [`DOCUMENT_TAG_NAME`].

mod record;
mod render;
mod search;

pub use record::{
    ElementRecord, ExportError, MAX_RECORD_DEPTH, TEXT_RECORD_TAG, to_json, to_json_pretty,
    to_record, write_json, write_json_to_file,
};
pub use render::{print_tree, tree_to_string, write_tree, write_tree_to_file};

use std::collections::BTreeSet;

use indexmap::IndexMap;
use thiserror::Error;

/// Map of attribute names to values for an element.
///
/// Keys are unique and case-sensitive. Iteration follows source order; a
/// repeated name keeps the position of its first occurrence and the value of
/// its last.
pub type AttributesMap = IndexMap<String, String>;

/// Tag name reported by the synthetic root node.
pub const DOCUMENT_TAG_NAME: &str = "document";

/// A type-safe index into the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// A single arena slot.
///
/// Relationships are stored as indices so parent, child and sibling hops are
/// all O(1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// What kind of node this is.
    pub node_type: NodeType,
    /// Non-owning link to the parent; `None` for the root and detached nodes.
    pub parent: Option<NodeId>,
    /// Children in document order.
    pub children: Vec<NodeId>,
    /// The node immediately after this one in the parent's children.
    pub next_sibling: Option<NodeId>,
    /// The node immediately before this one in the parent's children.
    pub prev_sibling: Option<NodeId>,
}

impl Node {
    const fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        }
    }
}

/// Node kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeType {
    /// The synthetic root created by every parse.
    Document,
    /// A tag with its attributes.
    Element(ElementData),
    /// A run of character data between tags.
    Text(String),
}

impl NodeType {
    /// Tag name of the node, or `None` for text.
    ///
    /// The document root answers [`DOCUMENT_TAG_NAME`].
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Self::Document => Some(DOCUMENT_TAG_NAME),
            Self::Element(data) => Some(data.tag_name.as_str()),
            Self::Text(_) => None,
        }
    }
}

/// Element-specific data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementData {
    /// Lower-cased tag name.
    pub tag_name: String,
    /// Attribute list. Attributes without a value map to `""`.
    pub attrs: AttributesMap,
}

impl ElementData {
    /// Create element data from a tag name and attributes.
    #[must_use]
    pub fn new(tag_name: impl Into<String>, attrs: AttributesMap) -> Self {
        Self {
            tag_name: tag_name.into(),
            attrs,
        }
    }

    /// Returns the element's id attribute value if present.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attrs.get("id").map(String::as_str)
    }

    /// Returns the set of whitespace-separated class names.
    #[must_use]
    pub fn classes(&self) -> BTreeSet<&str> {
        self.attrs
            .get("class")
            .map(|list| list.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Whether the class attribute contains `class` as one of its tokens.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.attrs
            .get("class")
            .is_some_and(|list| list.split_whitespace().any(|c| c == class))
    }
}

/// Errors raised by checked tree mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DomError {
    /// The id does not index a node in this tree.
    #[error("node {0:?} does not exist in this tree")]
    UnknownNode(NodeId),
    /// Inserting `child` under `parent` would make the tree cyclic.
    #[error("cannot insert {child:?} under {parent:?}: it is the same node or one of its ancestors")]
    HierarchyRequest {
        /// Intended parent.
        parent: NodeId,
        /// Node being inserted.
        child: NodeId,
    },
    /// `child` is not currently a child of `parent`.
    #[error("{child:?} is not a child of {parent:?}")]
    NotAChild {
        /// Expected parent.
        parent: NodeId,
        /// Supposed child.
        child: NodeId,
    },
    /// The document root can never gain a parent.
    #[error("the document root cannot be moved")]
    RootImmovable,
}

/// Arena-backed element tree.
///
/// Nodes detached with [`DomTree::remove_child`] stay in the arena (their ids
/// remain valid) but are no longer reachable from the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomTree {
    /// All nodes, indexed by `NodeId`. The document is always at index 0.
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree containing only the document root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeType::Document)],
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    ///
    /// Only the node's payload should be edited through this; use the
    /// mutation methods for anything touching links.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Number of arena slots, detached nodes included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a tree holds at least its document root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` indexes a node of this tree.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Allocate a detached node and return its ID.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(node_type));
        id
    }

    /// Allocate a node and append it as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Fails with [`DomError::UnknownNode`] if `parent` does not belong to
    /// this tree; nothing is allocated in that case.
    pub fn create_child(
        &mut self,
        parent: NodeId,
        node_type: NodeType,
    ) -> Result<NodeId, DomError> {
        self.check_exists(parent)?;
        let child = self.alloc(node_type);
        self.link_last(parent, child);
        Ok(child)
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// A child that is already attached elsewhere is detached first.
    ///
    /// # Errors
    ///
    /// Fails if either id is unknown, if `child` is the root, or if `parent`
    /// is `child` itself or one of its descendants.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insertion(parent, child)?;
        self.detach(child);
        self.link_last(parent, child);
        Ok(())
    }

    /// Insert `new_child` into `parent` immediately before `reference`.
    ///
    /// # Errors
    ///
    /// Same as [`DomTree::append_child`], plus [`DomError::NotAChild`] if
    /// `reference` is not a child of `parent`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        reference: NodeId,
    ) -> Result<(), DomError> {
        self.check_insertion(parent, new_child)?;
        self.check_child(parent, reference)?;
        if new_child == reference {
            return Ok(());
        }

        self.detach(new_child);

        let position = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == reference)
            .ok_or(DomError::NotAChild {
                parent,
                child: reference,
            })?;
        let prev = self.nodes[reference.0].prev_sibling;

        self.nodes[parent.0].children.insert(position, new_child);
        self.nodes[new_child.0].parent = Some(parent);
        self.nodes[new_child.0].prev_sibling = prev;
        self.nodes[new_child.0].next_sibling = Some(reference);
        self.nodes[reference.0].prev_sibling = Some(new_child);
        if let Some(prev_id) = prev {
            self.nodes[prev_id.0].next_sibling = Some(new_child);
        }
        Ok(())
    }

    /// Detach `child` from `parent`.
    ///
    /// The removed subtree stays in the arena and keeps its own children.
    ///
    /// # Errors
    ///
    /// Fails if either id is unknown or `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_child(parent, child)?;
        self.detach(child);
        Ok(())
    }

    /// Move every child of `from` to the end of `to`'s children, in order.
    ///
    /// # Errors
    ///
    /// Fails if either id is unknown or `to` lies inside the subtree of `from`.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) -> Result<(), DomError> {
        self.check_exists(from)?;
        self.check_exists(to)?;
        if from == to {
            return Ok(());
        }
        if self.is_descendant_of(to, from) {
            return Err(DomError::HierarchyRequest {
                parent: to,
                child: from,
            });
        }

        let moved = std::mem::take(&mut self.nodes[from.0].children);
        for child in moved {
            let node = &mut self.nodes[child.0];
            node.parent = None;
            node.prev_sibling = None;
            node.next_sibling = None;
            self.link_last(to, child);
        }
        Ok(())
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// Check if `descendant` is a strict descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Number of hops from `id` up to the top of its tree (0 for the root).
    #[must_use]
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over `id` and everything below it in depth-first pre-order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        let stack = if self.contains(id) { vec![id] } else { Vec::new() };
        DescendantIterator { tree: self, stack }
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Mutable element data, for editing attributes after a parse.
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(|n| match &mut n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Tag name of a node; see [`NodeType::tag_name`].
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| n.node_type.tag_name())
    }

    /// The first element child of the root, if any.
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .copied()
            .find(|&id| self.as_element(id).is_some())
    }

    /// Concatenation of every text node below `id`, in document order.
    ///
    /// Empty unless the tree was built with text capture enabled.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|n| self.as_text(n))
            .collect()
    }

    fn check_exists(&self, id: NodeId) -> Result<(), DomError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(DomError::UnknownNode(id))
        }
    }

    fn check_child(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_exists(parent)?;
        self.check_exists(child)?;
        if self.parent(child) == Some(parent) {
            Ok(())
        } else {
            Err(DomError::NotAChild { parent, child })
        }
    }

    fn check_insertion(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_exists(parent)?;
        self.check_exists(child)?;
        if child == NodeId::ROOT {
            return Err(DomError::RootImmovable);
        }
        if parent == child || self.is_descendant_of(parent, child) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        Ok(())
    }

    /// Unlink `child` from its parent and siblings, if it has any.
    fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.nodes[child.0].parent else {
            return;
        };
        let prev = self.nodes[child.0].prev_sibling;
        let next = self.nodes[child.0].next_sibling;

        self.nodes[parent.0].children.retain(|&c| c != child);
        if let Some(prev_id) = prev {
            self.nodes[prev_id.0].next_sibling = next;
        }
        if let Some(next_id) = next {
            self.nodes[next_id.0].prev_sibling = prev;
        }

        let node = &mut self.nodes[child.0];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Link a detached `child` as the last child of `parent`.
    fn link_last(&mut self, parent: NodeId, child: NodeId) {
        let prev_last_child = self.nodes[parent.0].children.last().copied();

        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);

        if let Some(prev_id) = prev_last_child {
            self.nodes[prev_id.0].next_sibling = Some(child);
            self.nodes[child.0].prev_sibling = Some(prev_id);
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Depth-first pre-order iterator over a subtree.
pub struct DescendantIterator<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
