//! Conformance harness for XQuery engines
//!
//! The crate runs a query against an engine collaborator, captures the outcome,
//! and decides pass/fail by interpreting a tree of assertions:
//! - [`Harness`]: runs one query and always produces an [`ExecutionOutcome`]
//! - [`Assertion`] and [`Evaluator`]: the assertion vocabulary and its interpreter
//! - [`TestCase`], [`TestSuite`] and [`SuiteRunner`]: orchestration and reporting
//!
//! # Example
//!
//! ```ignore
//! use xqts_harness::{Assertion, SuiteRunner, TestCase, TestSuite};
//!
//! let suite = TestSuite::new("arith")
//!     .with_test(TestCase::new("add", "1 + 1", Assertion::eq("2")));
//! let result = SuiteRunner::new(&engine).run_suite(&suite);
//! std::process::exit(result.exit_code());
//! ```

pub mod assertion;
pub mod config;
pub mod engine;
pub mod environment;
pub mod evaluator;
pub mod fixtures;
pub mod harness;
pub mod outcome;
pub mod report;
pub mod runner;
pub mod test_case;

pub use assertion::Assertion;
pub use config::{EvaluatorOptions, ImplementationCapabilities, RunnerConfig};
pub use engine::{PreparedQuery, QueryEngine, QueryRequest};
pub use environment::{LanguageVersion, QueryEnvironment};
pub use evaluator::{Evaluator, Mismatch};
pub use fixtures::{FixtureLoader, InMemoryFixtures};
pub use harness::{Harness, RESULT_VARIABLE_PROLOG};
pub use outcome::ExecutionOutcome;
pub use report::{FailureDiagnostic, generate_report};
pub use runner::{SuiteResult, SuiteRunner, TestResult, TestStatus};
pub use test_case::{Dependency, QuerySource, TestCase, TestSuite, ValueSource};
