use strum_macros::{Display, EnumString};
use thiserror::Error;

/// What the tree builder does with an end tag it cannot apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum RecoveryPolicy {
    /// Ignore the end tag, leave the cursor where it is and record a
    /// [`ParseIssue`].
    #[default]
    Lenient,
    /// Stop at the first such end tag with a [`ParseError`].
    Strict,
}

/// Whether character data between tags becomes part of the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum TextPolicy {
    /// Drop text; the tree holds elements only.
    #[default]
    Discard,
    /// Keep every non-blank run as a text node under the current element.
    Keep,
}

/// Parser configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserOptions {
    /// End tag recovery.
    pub recovery: RecoveryPolicy,
    /// Text capture.
    pub text: TextPolicy,
}

impl ParserOptions {
    /// Lenient recovery with text capture off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the recovery policy.
    #[must_use]
    pub const fn with_recovery(mut self, recovery: RecoveryPolicy) -> Self {
        self.recovery = recovery;
        self
    }

    /// Set the text policy.
    #[must_use]
    pub const fn with_text(mut self, text: TextPolicy) -> Self {
        self.text = text;
        self
    }
}

/// An end tag the tree builder could not apply.
///
/// Under [`RecoveryPolicy::Strict`] this is returned as an error; under
/// [`RecoveryPolicy::Lenient`] it is downgraded to a [`ParseIssue`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The end tag names a different element than the one currently open.
    #[error("end tag </{found}> at byte {offset} does not match open element <{expected}>")]
    MismatchedEndTag {
        /// Tag name of the element under the cursor.
        expected: String,
        /// Tag name carried by the end tag.
        found: String,
        /// Byte offset of the end tag.
        offset: usize,
    },
    /// An end tag arrived while no element was open.
    #[error("end tag </{found}> at byte {offset} has no open element to close")]
    UnexpectedEndTag {
        /// Tag name carried by the end tag.
        found: String,
        /// Byte offset of the end tag.
        offset: usize,
    },
}

impl ParseError {
    /// Byte offset of the offending end tag.
    #[must_use]
    pub const fn offset(&self) -> usize {
        match self {
            Self::MismatchedEndTag { offset, .. } | Self::UnexpectedEndTag { offset, .. } => *offset,
        }
    }
}

/// A recovery the lenient parser applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// Human-readable description.
    pub message: String,
    /// Index into the token stream where the issue was encountered.
    pub token_index: usize,
    /// Byte offset in the input.
    pub offset: usize,
}

impl ParseIssue {
    pub(crate) fn from_error(error: &ParseError, token_index: usize) -> Self {
        Self {
            message: error.to_string(),
            token_index,
            offset: error.offset(),
        }
    }
}
