//! Tree queries.
//!
//! Every query walks the subtree rooted at `from` in depth-first pre-order,
//! `from` itself included, and returns matches in that order.

use std::collections::HashMap;

use crate::{DomTree, ElementData, NodeId};

impl DomTree {
    /// All nodes whose tag name equals `name`, ignoring ASCII case.
    ///
    /// The root matches [`crate::DOCUMENT_TAG_NAME`].
    #[must_use]
    pub fn find_by_tag(&self, from: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(from)
            .filter(|&id| {
                self.tag_name(id)
                    .is_some_and(|tag| tag.eq_ignore_ascii_case(name))
            })
            .collect()
    }

    /// Elements carrying attribute `name`, and if `value` is given, whose
    /// value equals it exactly.
    #[must_use]
    pub fn find_by_attribute(&self, from: NodeId, name: &str, value: Option<&str>) -> Vec<NodeId> {
        self.descendants(from)
            .filter(|&id| {
                self.as_element(id)
                    .and_then(|e| e.attrs.get(name))
                    .is_some_and(|v| value.is_none_or(|wanted| v == wanted))
            })
            .collect()
    }

    /// Elements whose class list contains `class`.
    #[must_use]
    pub fn find_by_class(&self, from: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(from)
            .filter(|&id| self.as_element(id).is_some_and(|e| e.has_class(class)))
            .collect()
    }

    /// The first element in pre-order whose id is exactly `id`.
    ///
    /// Ids are not required to be unique; later duplicates are ignored.
    #[must_use]
    pub fn find_by_id(&self, from: NodeId, id: &str) -> Option<NodeId> {
        self.descendants(from)
            .find(|&node| self.as_element(node).and_then(ElementData::id) == Some(id))
    }

    /// Map every id value to its element in one pass.
    ///
    /// Duplicate ids are allowed; the element visited last wins.
    #[must_use]
    pub fn id_index(&self, from: NodeId) -> HashMap<String, NodeId> {
        self.descendants(from)
            .filter_map(|node| {
                self.as_element(node)
                    .and_then(|e| e.id())
                    .map(|id| (id.to_string(), node))
            })
            .collect()
    }
}
