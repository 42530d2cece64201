//! Errors raised while computing value semantics

use thiserror::Error;
use xqts_diagnostics::{ErrorCode, codes};

/// Result type for value operations
pub type ValueResult<T> = Result<T, ValueError>;

/// A value operation that has no defined result
///
/// These never escape the assertion evaluator as failures of the harness itself: an
/// assertion whose check raises one of these simply does not hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("effective boolean value is not defined for {found}")]
    EbvUndefined { found: String },

    #[error("invalid sequence type '{text}': {message}")]
    InvalidSequenceType { text: String, message: String },

    #[error("unknown atomic type '{name}'")]
    UnknownType { name: String },

    #[error("invalid lexical form '{value}' for xs:{type_name}")]
    InvalidLexical { type_name: String, value: String },

    #[error("cannot read expected value '{text}'")]
    InvalidExpected { text: String },

    #[error("{kind} node cannot be serialized outside an element")]
    TopLevelNode { kind: String },

    #[error("invalid regular expression '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },

    #[error("invalid regular expression flags '{flags}'")]
    InvalidRegexFlags { flags: String },

    #[error("malformed XML: {message}")]
    MalformedXml { message: String },
}

impl ValueError {
    pub(crate) fn malformed(message: impl ToString) -> Self {
        Self::MalformedXml {
            message: message.to_string(),
        }
    }

    pub(crate) fn lexical(type_name: &str, value: &str) -> Self {
        Self::InvalidLexical {
            type_name: type_name.to_string(),
            value: value.to_string(),
        }
    }

    /// Error code the equivalent XQuery operation would raise
    pub fn code(&self) -> ErrorCode {
        let local = match self {
            Self::EbvUndefined { .. } => codes::FORG0006,
            Self::InvalidSequenceType { .. } | Self::InvalidExpected { .. } => codes::XPST0003,
            Self::UnknownType { .. } => codes::XPST0051,
            Self::InvalidLexical { .. } => codes::FORG0001,
            Self::TopLevelNode { .. } => codes::SENR0001,
            Self::InvalidRegex { .. } => codes::FORX0002,
            Self::InvalidRegexFlags { .. } => codes::FORX0001,
            Self::MalformedXml { .. } => codes::FODC0006,
        };
        ErrorCode::new(local)
    }
}
