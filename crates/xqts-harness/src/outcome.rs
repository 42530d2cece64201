//! The result of running one query

use xqts_diagnostics::{ErrorCode, QueryError};
use xqts_xdm::{Item, Sequence, serialize};

/// Outcome of one query execution
///
/// Pure storage; assertions branch on the variant before looking inside.
#[derive(Debug, Clone)]
pub enum ExecutionOutcome {
    Success(Sequence),
    Failure(QueryError),
}

impl ExecutionOutcome {
    pub fn failure(code: impl Into<ErrorCode>, message: impl Into<String>) -> Self {
        Self::Failure(QueryError::new(code, message))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The result sequence of a successful run
    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Self::Success(sequence) => Some(sequence),
            Self::Failure(_) => None,
        }
    }

    /// The fault of a failed run
    pub fn as_error(&self) -> Option<&QueryError> {
        match self {
            Self::Failure(error) => Some(error),
            Self::Success(_) => None,
        }
    }

    /// The error code of a failed run
    pub fn as_error_code(&self) -> Option<&ErrorCode> {
        self.as_error().map(QueryError::code)
    }

    /// One-line description for diagnostics
    ///
    /// Successful results show their serialization when it exists; sequences that
    /// cannot be serialized fall back to their item count.
    pub fn summary(&self) -> String {
        match self {
            Self::Success(sequence) => match serialize(sequence) {
                Ok(text) if !sequence.is_empty() => {
                    format!("success: {} ({})", truncate(&text, 200), sequence.describe())
                }
                _ => format!("success: {}", sequence.describe()),
            },
            Self::Failure(error) => format!("error {}: {}", error.code, error.message),
        }
    }
}

impl From<Sequence> for ExecutionOutcome {
    fn from(sequence: Sequence) -> Self {
        Self::Success(sequence)
    }
}

impl From<Item> for ExecutionOutcome {
    fn from(item: Item) -> Self {
        Self::Success(Sequence::one(item))
    }
}

impl From<QueryError> for ExecutionOutcome {
    fn from(error: QueryError) -> Self {
        Self::Failure(error)
    }
}

impl From<Result<Sequence, QueryError>> for ExecutionOutcome {
    fn from(result: Result<Sequence, QueryError>) -> Self {
        match result {
            Ok(sequence) => Self::Success(sequence),
            Err(error) => Self::Failure(error),
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xqts_xdm::AtomicValue;

    #[test]
    fn test_accessors() {
        let ok = ExecutionOutcome::from(Sequence::one(AtomicValue::integer(2)));
        assert!(ok.is_success());
        assert_eq!(ok.as_sequence().map(Sequence::len), Some(1));
        assert!(ok.as_error().is_none());

        let err = ExecutionOutcome::failure("XQST0040", "duplicate attribute");
        assert!(err.as_sequence().is_none());
        assert_eq!(err.as_error_code().unwrap().local_name(), "XQST0040");
    }

    #[test]
    fn test_summary() {
        let ok = ExecutionOutcome::from(Sequence::one(AtomicValue::integer(2)));
        assert_eq!(ok.summary(), "success: 2 (1 item)");
        assert_eq!(
            ExecutionOutcome::from(Sequence::empty()).summary(),
            "success: empty sequence"
        );
        let err = ExecutionOutcome::failure("XPST0003", "syntax");
        assert_eq!(err.summary(), "error XPST0003: syntax");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("abc", 3), "abc");
    }
}
