//! Tag tokenizer.
//!
//! Scans raw input for `<name ...>` and `</name ...>` spans and, when asked,
//! the text runs between them. Everything else in the input is skipped.

/// Attribute extraction from the raw segment of a start tag.
pub mod attributes;
/// Pattern-driven scanner producing tokens lazily.
pub mod scanner;
/// Token types produced by the scanner.
pub mod token;

pub use attributes::extract_attributes;
pub use scanner::Tokenizer;
pub use token::Token;
