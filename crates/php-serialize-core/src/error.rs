//! Error types for PHP serialization and deserialization.
//!
//! Parsing failures carry the byte position and a preview of the input so the
//! offending token can be shown to the user. Serialization failures describe
//! the value that could not be written. [`Error`] wraps both, plus JSON input
//! errors, and [`Error::category`] maps any of them onto a small taxonomy.

use std::fmt;

use bstr::ByteSlice;
use thiserror::Error;

/// Number of bytes shown on each side of the error position in previews.
const PREVIEW_RADIUS: usize = 20;

/// Number of bytes quoted when reporting an unrecognized token.
const EXCERPT_LEN: usize = 20;

/// The main error type for PHP deserialization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct PhpDeserializeError {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// The byte position where the error occurred.
    pub position: usize,
    /// Optional context about what was being parsed.
    pub context: Option<String>,
    /// Preview of input around error position for debugging.
    pub input_preview: Option<String>,
}

impl fmt::Display for PhpDeserializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.kind, self.position)?;
        if let Some(ref ctx) = self.context {
            write!(f, " ({})", ctx)?;
        }
        if let Some(ref preview) = self.input_preview {
            write!(f, "\n{}", preview)?;
        }
        Ok(())
    }
}

/// Specific kinds of deserialization errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unexpected end of input.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// Expected a specific character but found something else.
    #[error("expected '{expected}', found '{found}'")]
    UnexpectedChar {
        /// The character that was expected.
        expected: char,
        /// The character that was found.
        found: char,
    },

    /// The input does not start with a recognized type tag.
    #[error("unsupported or invalid serialized format near \"{excerpt}\"")]
    UnsupportedFormat {
        /// A short excerpt of the offending text.
        excerpt: String,
    },

    /// Invalid integer value.
    #[error("invalid integer: {0}")]
    InvalidInteger(String),

    /// Invalid float value.
    #[error("invalid float: {0}")]
    InvalidFloat(String),

    /// Invalid boolean value.
    #[error("invalid boolean value: {0}")]
    InvalidBoolean(String),

    /// String length mismatch.
    #[error("string length mismatch: expected {expected} bytes, found {found}")]
    StringLengthMismatch {
        /// The declared length in bytes.
        expected: usize,
        /// The number of bytes actually available before the closing marker.
        found: usize,
    },

    /// Invalid UTF-8 sequence.
    #[error("invalid UTF-8 sequence")]
    InvalidUtf8,

    /// A reference names a composite that has not been seen yet.
    #[error("invalid reference index: {index} ({available} composite values seen)")]
    InvalidReference {
        /// The 1-based index found in the input.
        index: usize,
        /// How many composites were registered when the reference was read.
        available: usize,
    },

    /// Invalid array key type.
    #[error("invalid array key type: expected string or integer")]
    InvalidArrayKey,

    /// Nesting depth exceeded.
    #[error("maximum nesting depth ({0}) exceeded")]
    MaxDepthExceeded(usize),

    /// Input continues after the top-level value.
    #[error("unexpected trailing data after serialized value")]
    TrailingData,
}

impl PhpDeserializeError {
    /// Create a new error with the given kind and position.
    #[inline]
    pub fn new(kind: ErrorKind, position: usize) -> Self {
        Self {
            kind,
            position,
            context: None,
            input_preview: None,
        }
    }

    /// Build an [`ErrorKind::UnsupportedFormat`] error quoting the input at `position`.
    #[cold]
    pub fn unsupported_format(data: &[u8], position: usize) -> Self {
        let end = (position + EXCERPT_LEN).min(data.len());
        let excerpt = data
            .get(position..end)
            .map(|s| s.to_str_lossy().into_owned())
            .unwrap_or_default();
        Self::new(ErrorKind::UnsupportedFormat { excerpt }, position)
    }

    /// Add context to the error.
    #[inline]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add input preview around the error position for debugging.
    ///
    /// Shows up to 20 bytes before and after the error position.
    #[cold]
    pub fn with_input_preview(mut self, data: &[u8], error_pos: usize) -> Self {
        let start = error_pos.saturating_sub(PREVIEW_RADIUS).min(data.len());
        let end = (error_pos + PREVIEW_RADIUS).min(data.len());

        if start < end {
            let before = data[start..error_pos.min(end)].to_str_lossy();
            let preview = data[start..end].to_str_lossy();

            // Caret goes under the offending byte, counted in displayed chars.
            let mut result = String::with_capacity(preview.len() + PREVIEW_RADIUS + 2);
            result.push_str(&preview);
            result.push('\n');
            result.push_str(&" ".repeat(before.chars().count()));
            result.push('^');

            self.input_preview = Some(result);
        }
        self
    }

    /// Whether this error is a string length mismatch.
    pub fn is_length_mismatch(&self) -> bool {
        matches!(self.kind, ErrorKind::StringLengthMismatch { .. })
    }
}

/// Result type alias for PHP deserialization.
pub type Result<T> = std::result::Result<T, PhpDeserializeError>;

/// Errors raised while writing a value out, either as PHP text or as JSON.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SerializeError {
    /// The value cannot be expressed in the target format.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// A reference names a composite that was not visited before it.
    #[error("invalid reference index: {0}")]
    InvalidReference(usize),

    /// A reference points back at one of its own containers.
    #[error("circular reference to value {0} cannot be represented in JSON")]
    CircularReference(usize),

    /// Nesting depth exceeded.
    #[error("maximum nesting depth ({0}) exceeded")]
    MaxDepthExceeded(usize),

    /// Expanding shared references produced more values than allowed.
    #[error("shared references expand to more than {0} values")]
    ExpansionLimitExceeded(usize),

    /// Output contains string bytes that are not valid UTF-8.
    #[error("serialized output is not valid UTF-8")]
    InvalidUtf8,
}

/// Coarse classification of every error the engine can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A value kind outside the supported model.
    UnsupportedType,
    /// Malformed PHP serialized text.
    Format,
    /// A string's declared byte length does not match its payload.
    LengthMismatch,
    /// A reference that does not resolve.
    Reference,
    /// Invalid JSON input.
    JsonParse,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::UnsupportedType => "UnsupportedType",
            ErrorCategory::Format => "FormatError",
            ErrorCategory::LengthMismatch => "LengthMismatchError",
            ErrorCategory::Reference => "ReferenceError",
            ErrorCategory::JsonParse => "JsonParseError",
        };
        f.write_str(name)
    }
}

/// Any error surfaced by a top-level conversion.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// PHP serialized input could not be parsed.
    #[error(transparent)]
    Deserialize(#[from] PhpDeserializeError),

    /// A value could not be written out.
    #[error(transparent)]
    Serialize(#[from] SerializeError),

    /// JSON input could not be parsed.
    #[error("invalid JSON: {0}")]
    Json(String),
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}

impl Error {
    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Deserialize(e) => match e.kind {
                ErrorKind::StringLengthMismatch { .. } => ErrorCategory::LengthMismatch,
                ErrorKind::InvalidReference { .. } => ErrorCategory::Reference,
                _ => ErrorCategory::Format,
            },
            Error::Serialize(e) => match e {
                SerializeError::InvalidReference(_)
                | SerializeError::CircularReference(_)
                | SerializeError::ExpansionLimitExceeded(_) => ErrorCategory::Reference,
                SerializeError::UnsupportedType(_)
                | SerializeError::MaxDepthExceeded(_)
                | SerializeError::InvalidUtf8 => ErrorCategory::UnsupportedType,
            },
            Error::Json(_) => ErrorCategory::JsonParse,
        }
    }
}
