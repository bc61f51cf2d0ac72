//! Best-effort HTML tag scanner and tree builder.
//!
//! # Scope
//!
//! This crate implements:
//! - **Tokenizer**: pattern-based scanning for `<tag ...>` and `</tag>` spans,
//!   with optional text runs between them
//! - **Attribute extraction**: `name="value"` and bare `name` shapes
//! - **Tree builder**: a single cursor that descends on start tags and
//!   ascends on matching end tags, with a named recovery policy for the rest
//!
//! # Not Implemented
//!
//! This is not an HTML5 parser. Comments, doctype, CDATA, raw-text elements
//! (`script`, `style`), void elements and character references get no special
//! treatment; malformed input produces a best-effort tree, never an error
//! (unless [`RecoveryPolicy::Strict`] is requested).
//!
//! ```
//! let tree = twig_html::parse("<ul><li>a</li><li>b</li></ul>");
//! assert_eq!(tree.find_by_tag(tree.root(), "li").len(), 2);
//! ```

/// Tree construction.
pub mod parser;
/// Tag tokenizer.
pub mod tokenizer;

pub use parser::{
    HtmlParser, ParseError, ParseIssue, ParserOptions, RecoveryPolicy, TextPolicy, TreeBuilder,
    parse,
};
pub use tokenizer::{Token, Tokenizer, extract_attributes};
pub use twig_dom::{DomTree, NodeId};
