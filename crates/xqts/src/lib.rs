//! Conformance harness for XQuery engines
//!
//! This crate ties together:
//! - Error codes, engine faults and failure diagnostics
//! - The XPath data model and the value semantics assertions rely on
//!   (effective boolean value, string-value, typed and deep equality, serialization,
//!   sequence-type matching)
//! - The query execution harness, assertion evaluator and suite runner
//!
//! # Example
//!
//! ```ignore
//! use xqts::prelude::*;
//!
//! let harness = Harness::new(&engine);
//! let outcome = harness.run(&QueryRequest::new("<elem attr='value'/>"));
//! let evaluator = Evaluator::new(harness);
//! assert!(evaluator.evaluate(&Assertion::serialization("<elem attr=\"value\"/>"), &outcome));
//! ```

pub use xqts_diagnostics as diagnostics;
pub use xqts_harness as harness;
pub use xqts_xdm as xdm;

pub use xqts_diagnostics::{ErrorCode, HarnessError, QueryError};
pub use xqts_harness::{
    Assertion, Evaluator, ExecutionOutcome, Harness, QueryEngine, QueryRequest, SuiteRunner,
    TestCase, TestSuite,
};
pub use xqts_xdm::{Item, Sequence};

/// Everything needed to write a conformance suite
pub mod prelude {
    pub use xqts_diagnostics::{ErrorCode, QueryError, codes};
    pub use xqts_harness::{
        Assertion, Dependency, Evaluator, EvaluatorOptions, ExecutionOutcome, FixtureLoader,
        Harness, ImplementationCapabilities, InMemoryFixtures, PreparedQuery, QueryEngine,
        QueryEnvironment, QueryRequest, RunnerConfig, SuiteResult, SuiteRunner, TestCase,
        TestStatus, TestSuite, ValueSource, generate_report,
    };
    pub use xqts_xdm::{AtomicValue, Item, Node, QName, Sequence};
}
