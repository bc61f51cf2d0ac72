use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::trace;

use super::token::Token;

/// `<`, optional `/`, a name of ASCII letters or digits 1-6, then any run
/// without `<` or `>` up to the closing `>`.
const TAG_PATTERN: &str = r"<(/?)([a-zA-Z1-6]+)([^<>]*)>";

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TAG_PATTERN).expect("tag pattern is valid"));

/// Lazy tokenizer over a borrowed input string.
///
/// Tokens come out in left-to-right order. Input that does not form a tag is
/// skipped (or, with text capture on, becomes part of a text run), so the
/// tokenizer never fails. Cloning a fresh tokenizer, or calling
/// [`Tokenizer::new`] again, restarts the scan.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    input: &'a str,
    /// Byte offset where the next search starts.
    position: usize,
    /// Emit `Token::Text` for non-blank runs between tags.
    emit_text: bool,
    /// A tag found while a preceding text run was being returned.
    pending: Option<Token>,
    finished: bool,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer that emits tag tokens only.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            position: 0,
            emit_text: false,
            pending: None,
            finished: false,
        }
    }

    /// Turn text-run tokens on or off.
    #[must_use]
    pub const fn with_text(mut self, emit_text: bool) -> Self {
        self.emit_text = emit_text;
        self
    }

    /// Drain the tokenizer into a vector.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.collect()
    }

    fn tag_token(caps: &Captures<'_>) -> Option<Token> {
        let whole = caps.get(0)?;
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let name = caps.get(2)?.as_str().to_ascii_lowercase();
        let span = whole.range();

        let token = if closing {
            Token::EndTag { name, span }
        } else {
            Token::StartTag {
                name,
                raw_attributes: caps.get(3).map_or("", |m| m.as_str()).to_string(),
                span,
            }
        };
        trace!(?token, "tag");
        Some(token)
    }

    /// A text token for `start..end`, unless text is off or the run is blank.
    fn text_token(&self, start: usize, end: usize) -> Option<Token> {
        if !self.emit_text || start >= end {
            return None;
        }
        let data = &self.input[start..end];
        if data.trim().is_empty() {
            return None;
        }
        Some(Token::Text {
            data: data.to_string(),
            span: start..end,
        })
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(token) = self.pending.take() {
            return Some(token);
        }

        while !self.finished {
            let text_start = self.position;
            let Some(caps) = TAG_RE.captures_at(self.input, self.position) else {
                self.finished = true;
                self.position = self.input.len();
                return self.text_token(text_start, self.input.len());
            };
            let Some(whole) = caps.get(0) else {
                self.finished = true;
                return None;
            };
            self.position = whole.end();

            let Some(tag) = Self::tag_token(&caps) else {
                continue;
            };
            if let Some(text) = self.text_token(text_start, whole.start()) {
                self.pending = Some(tag);
                return Some(text);
            }
            return Some(tag);
        }
        None
    }
}
