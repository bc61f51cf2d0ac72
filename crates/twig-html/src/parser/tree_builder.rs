use tracing::{debug, trace};
use twig_dom::{DomTree, ElementData, NodeId, NodeType};

use super::options::{ParseError, ParseIssue, ParserOptions, RecoveryPolicy, TextPolicy};
use crate::tokenizer::{Token, Tokenizer, extract_attributes};

/// Cursor state machine that folds tokens into a [`DomTree`].
///
/// The cursor starts at the document root and only ever rests on the root or
/// on an element; text nodes are appended without moving it.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    tree: DomTree,
    cursor: NodeId,
}

impl TreeBuilder {
    /// A builder holding a fresh tree with the cursor on its root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: DomTree::new(),
            cursor: NodeId::ROOT,
        }
    }

    /// The node new children are currently appended to.
    #[must_use]
    pub const fn cursor(&self) -> NodeId {
        self.cursor
    }

    /// The tree built so far.
    #[must_use]
    pub const fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Apply one token.
    ///
    /// Returns the reason an end tag could not be applied; the cursor has
    /// not moved in that case and the caller decides whether to go on.
    pub fn process(&mut self, token: Token) -> Option<ParseError> {
        match token {
            Token::StartTag {
                name,
                raw_attributes,
                ..
            } => {
                let attrs = extract_attributes(&raw_attributes);
                let element = NodeType::Element(ElementData::new(name, attrs));
                match self.tree.create_child(self.cursor, element) {
                    Ok(id) => self.cursor = id,
                    Err(error) => debug!(%error, "start tag dropped"),
                }
                None
            }
            Token::Text { data, .. } => {
                if let Err(error) = self.tree.create_child(self.cursor, NodeType::Text(data)) {
                    debug!(%error, "text dropped");
                }
                None
            }
            Token::EndTag { name, span } => self.close(name, span.start),
        }
    }

    fn close(&mut self, found: String, offset: usize) -> Option<ParseError> {
        // The root has no parent, so nothing above it can be closed.
        let Some(parent) = self.tree.parent(self.cursor) else {
            return Some(ParseError::UnexpectedEndTag { found, offset });
        };
        let expected = self.tree.tag_name(self.cursor).unwrap_or_default();
        if expected.eq_ignore_ascii_case(&found) {
            trace!(tag = %found, "closed element");
            self.cursor = parent;
            None
        } else {
            Some(ParseError::MismatchedEndTag {
                expected: expected.to_string(),
                found,
                offset,
            })
        }
    }

    /// Hand back the tree, whether or not the cursor returned to the root.
    #[must_use]
    pub fn finish(self) -> DomTree {
        if self.cursor != NodeId::ROOT {
            debug!(
                open = self.tree.depth(self.cursor),
                "input ended with elements still open"
            );
        }
        self.tree
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `input` leniently into a tree of elements.
///
/// Never fails: unmatched end tags are ignored and elements left open at the
/// end stay where they are. Text between tags is discarded.
#[must_use]
pub fn parse(input: &str) -> DomTree {
    let mut builder = TreeBuilder::new();
    for token in Tokenizer::new(input) {
        if let Some(error) = builder.process(token) {
            debug!(%error, "ignored end tag");
        }
    }
    builder.finish()
}

/// Configurable front end over [`Tokenizer`] and [`TreeBuilder`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser {
    options: ParserOptions,
}

impl HtmlParser {
    /// Create a parser with the given options.
    #[must_use]
    pub const fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    /// The options this parser was built with.
    #[must_use]
    pub const fn options(&self) -> ParserOptions {
        self.options
    }

    /// Parse `input` into a tree.
    ///
    /// # Errors
    ///
    /// Only under [`RecoveryPolicy::Strict`], at the first end tag that does
    /// not close the element under the cursor.
    pub fn parse(&self, input: &str) -> Result<DomTree, ParseError> {
        self.parse_with_issues(input).map(|(tree, _)| tree)
    }

    /// Parse `input`, also returning every recovery that was applied.
    ///
    /// # Errors
    ///
    /// See [`HtmlParser::parse`].
    pub fn parse_with_issues(&self, input: &str) -> Result<(DomTree, Vec<ParseIssue>), ParseError> {
        let keep_text = self.options.text == TextPolicy::Keep;
        let mut builder = TreeBuilder::new();
        let mut issues = Vec::new();

        for (index, token) in Tokenizer::new(input).with_text(keep_text).enumerate() {
            let Some(error) = builder.process(token) else {
                continue;
            };
            match self.options.recovery {
                RecoveryPolicy::Strict => return Err(error),
                RecoveryPolicy::Lenient => {
                    debug!(%error, "ignored end tag");
                    issues.push(ParseIssue::from_error(&error, index));
                }
            }
        }

        let tree = builder.finish();
        debug!(
            nodes = tree.len(),
            issues = issues.len(),
            recovery = %self.options.recovery,
            "parsed document"
        );
        Ok((tree, issues))
    }
}
