use std::ops::Range;

/// One unit of tokenizer output.
///
/// `span` is the byte range of the token in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<name raw_attributes>`
    StartTag {
        /// Lower-cased tag name.
        name: String,
        /// Everything between the tag name and the closing `>`, untouched.
        raw_attributes: String,
        /// Byte range of the whole tag.
        span: Range<usize>,
    },
    /// `</name>`; anything after the name is ignored.
    EndTag {
        /// Lower-cased tag name.
        name: String,
        /// Byte range of the whole tag.
        span: Range<usize>,
    },
    /// Character data between two tags. Only produced when text capture is on.
    Text {
        /// The run, verbatim. Character references are not decoded.
        data: String,
        /// Byte range of the run.
        span: Range<usize>,
    },
}

impl Token {
    /// Byte offset at which the token starts.
    #[must_use]
    pub const fn offset(&self) -> usize {
        match self {
            Self::StartTag { span, .. } | Self::EndTag { span, .. } | Self::Text { span, .. } => {
                span.start
            }
        }
    }

    /// Tag name for start and end tags.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Self::StartTag { name, .. } | Self::EndTag { name, .. } => Some(name.as_str()),
            Self::Text { .. } => None,
        }
    }

    /// Whether this is an end tag.
    #[must_use]
    pub const fn is_closing(&self) -> bool {
        matches!(self, Self::EndTag { .. })
    }
}
