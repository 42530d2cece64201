//! Outcome and value builders for the usual scenarios

use xqts::prelude::*;

pub fn integers(values: &[i64]) -> Sequence {
    values.iter().map(|v| AtomicValue::integer(*v)).collect()
}

pub fn success(values: &[i64]) -> ExecutionOutcome {
    ExecutionOutcome::Success(integers(values))
}

pub fn failure(code: &str, message: &str) -> ExecutionOutcome {
    ExecutionOutcome::failure(code, message)
}

/// `<elem attr="value"/>`
pub fn elem() -> Node {
    Node::element(QName::local("elem"))
        .attribute(QName::local("attr"), "value")
        .build()
}

/// Evaluate with default options against a scripted engine
pub fn evaluate(
    engine: &dyn QueryEngine,
    assertion: &Assertion,
    outcome: &ExecutionOutcome,
) -> bool {
    Evaluator::new(Harness::new(engine)).evaluate(assertion, outcome)
}
