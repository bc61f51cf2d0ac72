//! Tree construction.
//!
//! A single cursor walks the tree: start tags append a child and descend,
//! a matching end tag ascends, and anything that does not fit is handled by
//! the configured [`RecoveryPolicy`].

/// Parser configuration, recovery policy and diagnostics.
pub mod options;
/// Cursor-based tree builder and the parser front end.
pub mod tree_builder;

pub use options::{ParseError, ParseIssue, ParserOptions, RecoveryPolicy, TextPolicy};
pub use tree_builder::{HtmlParser, TreeBuilder, parse};
