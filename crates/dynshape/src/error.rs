//! Error types for text-to-value conversion.

use crate::kind::Kind;
use thiserror::Error;

/// Boxed error returned by custom [`TextUnmarshaler`](crate::types::TextUnmarshaler)
/// implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while converting text into a value.
///
/// The comparator never fails, so this is the only error type in the crate.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The target cannot be resolved to a settable slot (nil interface, or a
    /// reflected value whose shape does not match the Rust type).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The text is not a valid literal of the target scalar kind.
    #[error("cannot parse '{text}' as {kind}: {reason}")]
    ParseFailed {
        text: String,
        kind: Kind,
        reason: String,
    },

    /// A map entry did not split into exactly one key and one value around `=`.
    #[error("malformed key=value pair '{0}'")]
    MalformedPair(String),

    /// The target kind has no text conversion (func, chan, unsafe pointer).
    #[error("unsupported target kind: {0}")]
    UnsupportedKind(String),

    /// A custom text unmarshaler rejected its input.
    #[error("{type_name} rejected '{text}': {source}")]
    CustomParseFailed {
        type_name: String,
        text: String,
        #[source]
        source: BoxError,
    },

    /// The compound grammar itself is malformed (unbalanced brackets,
    /// unterminated quote, too many struct elements).
    #[error("syntax error in '{text}': {message}")]
    Syntax { text: String, message: String },
}

impl ConvertError {
    pub(crate) fn parse_failed(text: &str, kind: Kind, reason: impl ToString) -> Self {
        ConvertError::ParseFailed {
            text: text.to_string(),
            kind,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn syntax(text: &str, message: impl Into<String>) -> Self {
        ConvertError::Syntax {
            text: text.to_string(),
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout dynshape.
pub type Result<T> = std::result::Result<T, ConvertError>;
