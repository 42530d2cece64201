//! Assertion vocabulary
//!
//! An [`Assertion`] is a declarative predicate over an [`ExecutionOutcome`]. Leaves
//! check one property of the outcome; `And`, `Or` and `Not` combine them. The tree
//! is interpreted by [`crate::Evaluator`].
//!
//! [`ExecutionOutcome`]: crate::ExecutionOutcome

use std::fmt;

/// A predicate over an execution outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assertion {
    /// Per-item typed equality against a literal token list
    Eq(String),
    /// Effective boolean value of the result
    BooleanEquals(bool),
    /// Space-joined string-value of the result
    StringValueEquals {
        expected: String,
        normalize_space: bool,
    },
    /// Exact serialization of the result
    SerializationEquals(String),
    /// A query over `$result` whose effective boolean value must be true
    QueryHolds(String),
    /// Dynamic sequence-type match
    TypeMatches(String),
    IsEmpty,
    /// The query failed with this error code (local name, or `*`)
    ErrorEquals(String),
    /// The result has exactly this many items
    Count(usize),
    /// The result is deep-equal to the value of a query
    DeepEq(String),
    /// The result is a permutation of the value of a query
    Permutation(String),
    /// The serialization is equal to an XML fragment, modulo insignificant differences
    XmlEquals {
        expected: String,
        ignore_prefixes: bool,
    },
    /// The serialization matches a regular expression
    SerializationMatches { pattern: String, flags: String },
    /// The query, or the serialization of its result, fails with this code
    SerializationError(String),
    Not(Box<Assertion>),
    And(Box<Assertion>, Box<Assertion>),
    Or(Box<Assertion>, Box<Assertion>),
}

impl Assertion {
    pub fn eq(expected: impl Into<String>) -> Self {
        Self::Eq(expected.into())
    }

    pub fn boolean(expected: bool) -> Self {
        Self::BooleanEquals(expected)
    }

    pub fn true_() -> Self {
        Self::BooleanEquals(true)
    }

    pub fn false_() -> Self {
        Self::BooleanEquals(false)
    }

    pub fn string_value(expected: impl Into<String>) -> Self {
        Self::StringValueEquals {
            expected: expected.into(),
            normalize_space: false,
        }
    }

    pub fn string_value_normalized(expected: impl Into<String>) -> Self {
        Self::StringValueEquals {
            expected: expected.into(),
            normalize_space: true,
        }
    }

    pub fn serialization(expected: impl Into<String>) -> Self {
        Self::SerializationEquals(expected.into())
    }

    pub fn query(expression: impl Into<String>) -> Self {
        Self::QueryHolds(expression.into())
    }

    pub fn type_matches(sequence_type: impl Into<String>) -> Self {
        Self::TypeMatches(sequence_type.into())
    }

    pub fn empty() -> Self {
        Self::IsEmpty
    }

    pub fn error(code: impl Into<String>) -> Self {
        Self::ErrorEquals(code.into())
    }

    pub fn count(n: usize) -> Self {
        Self::Count(n)
    }

    pub fn deep_eq(expression: impl Into<String>) -> Self {
        Self::DeepEq(expression.into())
    }

    pub fn permutation(expression: impl Into<String>) -> Self {
        Self::Permutation(expression.into())
    }

    pub fn xml(expected: impl Into<String>) -> Self {
        Self::XmlEquals {
            expected: expected.into(),
            ignore_prefixes: false,
        }
    }

    pub fn serialization_matches(pattern: impl Into<String>, flags: impl Into<String>) -> Self {
        Self::SerializationMatches {
            pattern: pattern.into(),
            flags: flags.into(),
        }
    }

    pub fn serialization_error(code: impl Into<String>) -> Self {
        Self::SerializationError(code.into())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    pub fn and(self, right: Assertion) -> Self {
        Self::And(Box::new(self), Box::new(right))
    }

    pub fn or(self, right: Assertion) -> Self {
        Self::Or(Box::new(self), Box::new(right))
    }

    /// Conjunction of all assertions, evaluated left to right
    ///
    /// Returns `None` for an empty list.
    pub fn all_of(assertions: impl IntoIterator<Item = Assertion>) -> Option<Self> {
        assertions.into_iter().reduce(Assertion::and)
    }

    /// Disjunction of all assertions, evaluated left to right
    ///
    /// Returns `None` for an empty list.
    pub fn any_of(assertions: impl IntoIterator<Item = Assertion>) -> Option<Self> {
        assertions.into_iter().reduce(Assertion::or)
    }

    /// Whether this leaf only holds for a successful outcome
    pub fn requires_success(&self) -> bool {
        !matches!(
            self,
            Self::ErrorEquals(_)
                | Self::SerializationError(_)
                | Self::Not(_)
                | Self::And(..)
                | Self::Or(..)
        )
    }

    /// Whether this leaf runs another query when evaluated
    pub fn runs_query(&self) -> bool {
        matches!(
            self,
            Self::QueryHolds(_) | Self::DeepEq(_) | Self::Permutation(_)
        )
    }
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq(expected) => write!(f, "assert-eq({})", expected),
            Self::BooleanEquals(true) => write!(f, "assert-true"),
            Self::BooleanEquals(false) => write!(f, "assert-false"),
            Self::StringValueEquals {
                expected,
                normalize_space,
            } => {
                if *normalize_space {
                    write!(f, "assert-string-value[normalize-space](\"{}\")", expected)
                } else {
                    write!(f, "assert-string-value(\"{}\")", expected)
                }
            }
            Self::SerializationEquals(expected) => write!(f, "assert-serialization({})", expected),
            Self::QueryHolds(expression) => write!(f, "assert({})", expression),
            Self::TypeMatches(sequence_type) => write!(f, "assert-type({})", sequence_type),
            Self::IsEmpty => write!(f, "assert-empty"),
            Self::ErrorEquals(code) => write!(f, "error({})", code),
            Self::Count(n) => write!(f, "assert-count({})", n),
            Self::DeepEq(expression) => write!(f, "assert-deep-eq({})", expression),
            Self::Permutation(expression) => write!(f, "assert-permutation({})", expression),
            Self::XmlEquals {
                expected,
                ignore_prefixes,
            } => {
                if *ignore_prefixes {
                    write!(f, "assert-xml[ignore-prefixes]({})", expected)
                } else {
                    write!(f, "assert-xml({})", expected)
                }
            }
            Self::SerializationMatches { pattern, flags } => {
                if flags.is_empty() {
                    write!(f, "serialization-matches({})", pattern)
                } else {
                    write!(f, "serialization-matches({}, flags={})", pattern, flags)
                }
            }
            Self::SerializationError(code) => write!(f, "serialization-error({})", code),
            Self::Not(inner) => write!(f, "not({})", inner),
            Self::And(left, right) => write!(f, "all-of({}, {})", left, right),
            Self::Or(left, right) => write!(f, "any-of({}, {})", left, right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_of_is_left_leaning() {
        let a = Assertion::all_of([
            Assertion::count(1),
            Assertion::eq("2"),
            Assertion::true_(),
        ])
        .unwrap();
        let expected = Assertion::count(1)
            .and(Assertion::eq("2"))
            .and(Assertion::true_());
        assert_eq!(a, expected);
        assert!(Assertion::any_of([]).is_none());
    }

    #[test]
    fn test_single_element_chain() {
        assert_eq!(Assertion::any_of([Assertion::IsEmpty]), Some(Assertion::IsEmpty));
    }

    #[test]
    fn test_requires_success() {
        assert!(Assertion::eq("1").requires_success());
        assert!(Assertion::count(0).requires_success());
        assert!(!Assertion::error("XPST0003").requires_success());
        assert!(!Assertion::serialization_error("SENR0001").requires_success());
        assert!(!Assertion::IsEmpty.not().requires_success());
    }

    #[test]
    fn test_display() {
        let a = Assertion::error("XPST0003").or(Assertion::error("XQST0118"));
        assert_eq!(a.to_string(), "any-of(error(XPST0003), error(XQST0118))");
        assert_eq!(
            Assertion::string_value_normalized("a b").to_string(),
            "assert-string-value[normalize-space](\"a b\")"
        );
        assert_eq!(Assertion::true_().not().to_string(), "not(assert-true)");
    }
}
