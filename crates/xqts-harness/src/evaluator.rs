//! Assertion evaluator
//!
//! Interprets an [`Assertion`] tree against an [`ExecutionOutcome`]. Evaluation
//! always yields a verdict: precondition mismatches (a success-only assertion against
//! a failure, or an error assertion against a result) and faults while computing a
//! value are both reported as a [`Mismatch`], never raised.
//!
//! `And` and `Or` evaluate strictly left to right and stop as soon as the verdict
//! is known. Assertions that run further queries (`QueryHolds`, `DeepEq`,
//! `Permutation`) do so through the same [`Harness`], as fresh independent runs
//! with `$result` bound to the outcome's sequence.

use crate::assertion::Assertion;
use crate::config::EvaluatorOptions;
use crate::engine::QueryRequest;
use crate::environment::QueryEnvironment;
use crate::harness::{Harness, RESULT_VARIABLE_PROLOG};
use crate::outcome::ExecutionOutcome;
use log::{trace, warn};
use std::sync::Arc;
use thiserror::Error;
use xqts_diagnostics::{ErrorCode, QueryError};
use xqts_xdm::{
    DeepEqualOptions, Sequence, SequenceType, ValueResult, deep_equal, deep_equal_with,
    effective_boolean_value, item_string_value, normalize_space, parse_document, serialize,
    string_value, typed_equal, xpath_regex,
};

/// An assertion that does not hold, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{assertion} failed: {reason}")]
pub struct Mismatch {
    /// The innermost assertion that decided the verdict
    pub assertion: Assertion,
    pub reason: String,
}

impl Mismatch {
    fn new(assertion: &Assertion, reason: impl Into<String>) -> Self {
        Self {
            assertion: assertion.clone(),
            reason: reason.into(),
        }
    }
}

/// Outcome of a single leaf check
type Verdict = Result<(), String>;

fn verdict(holds: bool, reason: impl FnOnce() -> String) -> Verdict {
    if holds { Ok(()) } else { Err(reason()) }
}

/// Interprets assertion trees
#[derive(Debug, Clone)]
pub struct Evaluator<'h> {
    harness: Harness<'h>,
    environment: Arc<QueryEnvironment>,
    options: EvaluatorOptions,
}

impl<'h> Evaluator<'h> {
    pub fn new(harness: Harness<'h>) -> Self {
        Self {
            harness,
            environment: Arc::default(),
            options: EvaluatorOptions::default(),
        }
    }

    /// Environment used by nested assertion queries
    pub fn with_environment(mut self, environment: Arc<QueryEnvironment>) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_options(mut self, options: EvaluatorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &EvaluatorOptions {
        &self.options
    }

    /// Whether the assertion holds for the outcome
    pub fn evaluate(&self, assertion: &Assertion, outcome: &ExecutionOutcome) -> bool {
        self.check(assertion, outcome).is_ok()
    }

    /// Check the assertion, explaining why it does not hold
    pub fn check(&self, assertion: &Assertion, outcome: &ExecutionOutcome) -> Result<(), Mismatch> {
        trace!("evaluating {}", assertion);
        match assertion {
            Assertion::And(left, right) => {
                self.check(left, outcome)?;
                self.check(right, outcome)
            }
            Assertion::Or(left, right) => match self.check(left, outcome) {
                Ok(()) => Ok(()),
                Err(first) => self.check(right, outcome).map_err(|second| {
                    Mismatch::new(
                        assertion,
                        format!(
                            "no alternative holds ({}; {})",
                            first.reason, second.reason
                        ),
                    )
                }),
            },
            Assertion::Not(inner) => match self.check(inner, outcome) {
                Ok(()) => Err(Mismatch::new(assertion, format!("{} holds", inner))),
                Err(_) => Ok(()),
            },
            leaf => self
                .check_leaf(leaf, outcome)
                .map_err(|reason| Mismatch::new(leaf, reason)),
        }
    }

    fn check_leaf(&self, assertion: &Assertion, outcome: &ExecutionOutcome) -> Verdict {
        match assertion {
            Assertion::ErrorEquals(expected) => self.check_error(expected, outcome),
            Assertion::SerializationError(expected) => match outcome {
                ExecutionOutcome::Success(sequence) => match serialize(sequence) {
                    Ok(text) => Err(format!(
                        "expected serialization error {}, serialized as {}",
                        expected, text
                    )),
                    Err(e) => self.check_code(expected, &e.code(), &e.to_string()),
                },
                ExecutionOutcome::Failure(_) => self.check_error(expected, outcome),
            },
            _ => match outcome {
                ExecutionOutcome::Success(sequence) => {
                    self.check_result(assertion, sequence).unwrap_or_else(|e| {
                        warn!("cannot evaluate {}: {}", assertion, e);
                        Err(format!("cannot evaluate assertion: [{}] {}", e.code(), e))
                    })
                }
                ExecutionOutcome::Failure(error) => {
                    Err(format!("expected a result, query raised {}", error))
                }
            },
        }
    }

    fn check_error(&self, expected: &str, outcome: &ExecutionOutcome) -> Verdict {
        match outcome {
            ExecutionOutcome::Failure(QueryError { code, message }) => {
                self.check_code(expected, code, message)
            }
            ExecutionOutcome::Success(sequence) => Err(format!(
                "expected error {}, query returned {}",
                expected,
                render(sequence)
            )),
        }
    }

    fn check_code(&self, expected: &str, actual: &ErrorCode, message: &str) -> Verdict {
        verdict(!self.options.check_error_codes || actual.matches(expected), || {
            format!("expected error {}, got {}: {}", expected, actual, message)
        })
    }

    fn check_result(&self, assertion: &Assertion, sequence: &Sequence) -> ValueResult<Verdict> {
        let result = match assertion {
            Assertion::Eq(expected) => verdict(typed_equal(expected, sequence)?, || {
                format!("expected {}, got {}", expected, render(sequence))
            }),
            Assertion::BooleanEquals(expected) => {
                let actual = effective_boolean_value(sequence)?;
                verdict(actual == *expected, || {
                    format!("effective boolean value is {}", actual)
                })
            }
            Assertion::StringValueEquals {
                expected,
                normalize_space: normalize,
            } => {
                let mut actual = string_value(sequence);
                let mut expected = expected.clone();
                if *normalize {
                    actual = normalize_space(&actual);
                    expected = normalize_space(&expected);
                }
                verdict(actual == expected, || {
                    format!("expected string value {:?}, got {:?}", expected, actual)
                })
            }
            Assertion::SerializationEquals(expected) => {
                let actual = serialize(sequence)?;
                verdict(actual == *expected, || {
                    format!("expected {}, serialized as {}", expected, actual)
                })
            }
            Assertion::QueryHolds(expression) => match self.run_nested(expression, sequence) {
                ExecutionOutcome::Success(result) => {
                    verdict(effective_boolean_value(&result)?, || {
                        format!("query is false for {}", render(sequence))
                    })
                }
                ExecutionOutcome::Failure(error) => {
                    Err(format!("assertion query raised {}", error))
                }
            },
            Assertion::TypeMatches(text) => {
                let sequence_type = SequenceType::parse(text)?;
                verdict(sequence_type.matches(sequence), || {
                    format!("{} is not an instance of {}", sequence.describe(), text)
                })
            }
            Assertion::IsEmpty => verdict(sequence.is_empty(), || {
                format!("expected empty sequence, got {}", render(sequence))
            }),
            Assertion::Count(n) => verdict(sequence.len() == *n, || {
                format!("expected {} items, got {}", n, sequence.len())
            }),
            Assertion::DeepEq(expression) => match self.run_nested(expression, sequence) {
                ExecutionOutcome::Success(expected) => {
                    verdict(deep_equal(sequence, &expected), || {
                        format!("expected {}, got {}", render(&expected), render(sequence))
                    })
                }
                ExecutionOutcome::Failure(error) => {
                    Err(format!("expected-value query raised {}", error))
                }
            },
            Assertion::Permutation(expression) => match self.run_nested(expression, sequence) {
                ExecutionOutcome::Success(expected) => {
                    verdict(is_permutation(sequence, &expected), || {
                        format!(
                            "{} is not a permutation of {}",
                            render(sequence),
                            render(&expected)
                        )
                    })
                }
                ExecutionOutcome::Failure(error) => {
                    Err(format!("expected-value query raised {}", error))
                }
            },
            Assertion::XmlEquals {
                expected,
                ignore_prefixes,
            } => {
                let actual = serialize(sequence)?;
                if actual == *expected {
                    Ok(())
                } else {
                    let options = DeepEqualOptions::xml_comparison(*ignore_prefixes);
                    let left = Sequence::one(parse_document(&wrap_fragment(&actual))?);
                    let right = Sequence::one(parse_document(&wrap_fragment(expected))?);
                    verdict(deep_equal_with(&left, &right, options), || {
                        format!("expected {}, serialized as {}", expected, actual)
                    })
                }
            }
            Assertion::SerializationMatches { pattern, flags } => {
                let regex = xpath_regex(pattern, flags)?;
                let actual = serialize(sequence)?;
                verdict(regex.is_match(&actual), || {
                    format!("{} does not match /{}/{}", actual, pattern, flags)
                })
            }
            Assertion::ErrorEquals(_)
            | Assertion::SerializationError(_)
            | Assertion::Not(_)
            | Assertion::And(..)
            | Assertion::Or(..) => Err(format!("{} is not a result assertion", assertion)),
        };
        Ok(result)
    }

    /// Run an assertion query with `$result` bound to the outcome's sequence
    fn run_nested(&self, expression: &str, result: &Sequence) -> ExecutionOutcome {
        let query = if self.options.declare_result_variable {
            format!("{}{}", RESULT_VARIABLE_PROLOG, expression)
        } else {
            expression.to_string()
        };
        let request = QueryRequest::new(query)
            .bind("result", result.clone())
            .with_environment(Arc::clone(&self.environment));
        self.harness.run(&request)
    }
}

/// Same multiset of item string values
fn is_permutation(actual: &Sequence, expected: &Sequence) -> bool {
    if actual.len() != expected.len() {
        return false;
    }
    let mut left: Vec<String> = actual.iter().map(item_string_value).collect();
    let mut right: Vec<String> = expected.iter().map(item_string_value).collect();
    left.sort_unstable();
    right.sort_unstable();
    left == right
}

fn wrap_fragment(fragment: &str) -> String {
    format!("<X>{}</X>", fragment)
}

fn render(sequence: &Sequence) -> String {
    if sequence.is_empty() {
        return "()".to_string();
    }
    serialize(sequence).unwrap_or_else(|_| sequence.describe())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{PreparedQuery, QueryEngine};
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use xqts_xdm::{AtomicValue, Node, QName};

    /// Engine answering `true()`/`false()`, echoing `$result` for `$result`, and
    /// failing everything else
    #[derive(Default)]
    struct EchoEngine {
        runs: AtomicUsize,
    }

    struct Echo(Result<Sequence, QueryError>);

    impl QueryEngine for EchoEngine {
        fn prepare<'e>(
            &'e self,
            request: &QueryRequest,
        ) -> Result<Box<dyn PreparedQuery + 'e>, QueryError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            let body = request
                .query
                .strip_prefix(RESULT_VARIABLE_PROLOG)
                .unwrap_or(&request.query);
            let result = match body {
                "true()" => Ok(Sequence::one(AtomicValue::boolean(true))),
                "false()" => Ok(Sequence::one(AtomicValue::boolean(false))),
                "$result" => Ok(request.binding("result").cloned().unwrap_or_default()),
                "(3, 1, 2)" => Ok([3, 1, 2].map(AtomicValue::integer).into_iter().collect()),
                _ => Err(QueryError::new("XPST0003", "unsupported")),
            };
            Ok(Box::new(Echo(result)))
        }
    }

    impl PreparedQuery for Echo {
        fn execute(&mut self) -> Result<Sequence, QueryError> {
            self.0.clone()
        }

        fn close(&mut self) {}
    }

    fn integers(values: &[i64]) -> ExecutionOutcome {
        ExecutionOutcome::Success(values.iter().map(|v| AtomicValue::integer(*v)).collect())
    }

    fn elem() -> ExecutionOutcome {
        let node = Node::element(QName::local("elem"))
            .attribute(QName::local("attr"), "value")
            .build();
        ExecutionOutcome::Success(Sequence::one(node))
    }

    #[rstest]
    #[case(Assertion::eq("2"), true)]
    #[case(Assertion::eq("3"), false)]
    #[case(Assertion::true_(), true)]
    #[case(Assertion::count(1), true)]
    #[case(Assertion::IsEmpty, false)]
    #[case(Assertion::string_value("2"), true)]
    #[case(Assertion::type_matches("xs:integer"), true)]
    #[case(Assertion::type_matches("xs:string"), false)]
    #[case(Assertion::serialization("2"), true)]
    #[case(Assertion::error("XPST0003"), false)]
    #[case(Assertion::error("*"), false)]
    #[case(Assertion::IsEmpty.not(), true)]
    fn test_integer_two(#[case] assertion: Assertion, #[case] expected: bool) {
        let engine = EchoEngine::default();
        let evaluator = Evaluator::new(Harness::new(&engine));
        assert_eq!(evaluator.evaluate(&assertion, &integers(&[2])), expected);
    }

    #[test]
    fn test_empty_sequence() {
        let engine = EchoEngine::default();
        let evaluator = Evaluator::new(Harness::new(&engine));
        let outcome = integers(&[]);
        assert!(evaluator.evaluate(&Assertion::IsEmpty, &outcome));
        assert!(!evaluator.evaluate(&Assertion::true_(), &outcome));
        assert!(evaluator.evaluate(&Assertion::false_(), &outcome));
    }

    #[test]
    fn test_error_outcome() {
        let engine = EchoEngine::default();
        let evaluator = Evaluator::new(Harness::new(&engine));
        let outcome = ExecutionOutcome::failure("XQST0040", "duplicate attribute");
        assert!(evaluator.evaluate(&Assertion::error("XQST0040"), &outcome));
        assert!(evaluator.evaluate(&Assertion::error("err:XQST0040"), &outcome));
        assert!(!evaluator.evaluate(&Assertion::error("XPST0003"), &outcome));
        assert!(!evaluator.evaluate(&Assertion::IsEmpty, &outcome));
        assert!(!evaluator.evaluate(&Assertion::count(0), &outcome));
    }

    #[test]
    fn test_unchecked_error_codes() {
        let engine = EchoEngine::default();
        let evaluator = Evaluator::new(Harness::new(&engine))
            .with_options(EvaluatorOptions::default().with_error_codes_checked(false));
        let outcome = ExecutionOutcome::failure("XQST0040", "duplicate attribute");
        assert!(evaluator.evaluate(&Assertion::error("XPST0003"), &outcome));
        assert!(!evaluator.evaluate(&Assertion::error("XPST0003"), &integers(&[1])));
    }

    #[test]
    fn test_or_alternatives() {
        let engine = EchoEngine::default();
        let evaluator = Evaluator::new(Harness::new(&engine));
        let outcome = ExecutionOutcome::failure("XQST0118", "mismatched tags");
        let either = Assertion::error("XPST0003").or(Assertion::error("XQST0118"));
        assert!(evaluator.evaluate(&either, &outcome));

        let neither = Assertion::error("XPST0003").or(Assertion::error("XQDY0091"));
        let mismatch = evaluator.check(&neither, &outcome).unwrap_err();
        assert_eq!(mismatch.assertion, neither);
        assert!(mismatch.reason.starts_with("no alternative holds"));
    }

    #[test]
    fn test_and_reports_first_failing_leaf() {
        let engine = EchoEngine::default();
        let evaluator = Evaluator::new(Harness::new(&engine));
        let both = Assertion::count(1).and(Assertion::eq("3"));
        let mismatch = evaluator.check(&both, &integers(&[2])).unwrap_err();
        assert_eq!(mismatch.assertion, Assertion::eq("3"));
        assert_eq!(mismatch.reason, "expected 3, got 2");
    }

    #[test]
    fn test_ebv_fault_is_false_not_error() {
        let engine = EchoEngine::default();
        let evaluator = Evaluator::new(Harness::new(&engine));
        let outcome = integers(&[1, 2]);
        assert!(!evaluator.evaluate(&Assertion::true_(), &outcome));
        assert!(!evaluator.evaluate(&Assertion::false_(), &outcome));
        assert!(evaluator.evaluate(&Assertion::true_().not(), &outcome));
        let mismatch = evaluator.check(&Assertion::true_(), &outcome).unwrap_err();
        assert!(mismatch.reason.contains("FORG0006"));
    }

    #[test]
    fn test_query_holds_runs_nested_query() {
        let engine = EchoEngine::default();
        let evaluator = Evaluator::new(Harness::new(&engine));
        assert!(evaluator.evaluate(&Assertion::query("true()"), &integers(&[2])));
        assert!(!evaluator.evaluate(&Assertion::query("false()"), &integers(&[2])));
        assert!(!evaluator.evaluate(&Assertion::query("count($result)"), &integers(&[2])));
        assert_eq!(engine.runs.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_query_holds_not_run_against_failure() {
        let engine = EchoEngine::default();
        let evaluator = Evaluator::new(Harness::new(&engine));
        let outcome = ExecutionOutcome::failure("FOER0000", "boom");
        assert!(!evaluator.evaluate(&Assertion::query("true()"), &outcome));
        assert_eq!(engine.runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_deep_eq_and_permutation() {
        let engine = EchoEngine::default();
        let evaluator = Evaluator::new(Harness::new(&engine));
        let outcome = integers(&[1, 2, 3]);
        assert!(evaluator.evaluate(&Assertion::deep_eq("$result"), &outcome));
        assert!(!evaluator.evaluate(&Assertion::deep_eq("(3, 1, 2)"), &outcome));
        assert!(evaluator.evaluate(&Assertion::permutation("(3, 1, 2)"), &outcome));
        assert!(!evaluator.evaluate(&Assertion::permutation("(3, 1, 2)"), &integers(&[1, 2])));
    }

    #[test]
    fn test_serialization_assertions() {
        let engine = EchoEngine::default();
        let evaluator = Evaluator::new(Harness::new(&engine));
        let outcome = elem();
        assert!(evaluator.evaluate(&Assertion::serialization("<elem attr=\"value\"/>"), &outcome));
        assert!(evaluator.evaluate(&Assertion::xml("<elem attr='value'></elem>"), &outcome));
        assert!(!evaluator.evaluate(&Assertion::xml("<elem attr='other'/>"), &outcome));
        assert!(evaluator.evaluate(
            &Assertion::serialization_matches("^<ELEM", "i"),
            &outcome
        ));
        assert!(!evaluator.evaluate(&Assertion::serialization_matches("(", ""), &outcome));
    }

    #[test]
    fn test_serialization_error() {
        let engine = EchoEngine::default();
        let evaluator = Evaluator::new(Harness::new(&engine));
        let attribute = Node::attribute(QName::local("a"), "1");
        let attribute = ExecutionOutcome::Success(Sequence::one(attribute));
        assert!(evaluator.evaluate(&Assertion::serialization_error("SENR0001"), &attribute));
        assert!(!evaluator.evaluate(&Assertion::serialization_error("SENR0001"), &elem()));
        let failed = ExecutionOutcome::failure("SEPM0004", "standalone");
        assert!(evaluator.evaluate(&Assertion::serialization_error("SEPM0004"), &failed));
    }

    #[test]
    fn test_string_value_normalized() {
        let engine = EchoEngine::default();
        let evaluator = Evaluator::new(Harness::new(&engine));
        let node = Node::element(QName::local("p")).text("  a \n b ").build();
        let outcome = ExecutionOutcome::Success(Sequence::one(node));
        assert!(evaluator.evaluate(&Assertion::string_value_normalized("a b"), &outcome));
        assert!(!evaluator.evaluate(&Assertion::string_value("a b"), &outcome));
    }
}
