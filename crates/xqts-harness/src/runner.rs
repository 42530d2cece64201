//! Suite orchestration
//!
//! Runs each test case once: resolve its query, context and bindings, run the
//! query through the [`Harness`], and judge the outcome with the [`Evaluator`].
//! Test cases share nothing mutable, so a suite can fan out over the rayon pool.

use crate::config::RunnerConfig;
use crate::engine::{QueryEngine, QueryRequest};
use crate::environment::QueryEnvironment;
use crate::evaluator::Evaluator;
use crate::fixtures::FixtureLoader;
use crate::harness::Harness;
use crate::outcome::ExecutionOutcome;
use crate::report::FailureDiagnostic;
use crate::test_case::{QuerySource, TestCase, TestSuite, ValueSource};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use xqts_diagnostics::{HarnessError, QueryError};
use xqts_xdm::{Item, Sequence};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Verdict of one test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestStatus {
    Passed,
    Failed,
    /// A dependency is not met by the engine
    Skipped,
    /// The test could not be set up
    Errored,
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Passed => write!(f, "passed"),
            TestStatus::Failed => write!(f, "failed"),
            TestStatus::Skipped => write!(f, "skipped"),
            TestStatus::Errored => write!(f, "errored"),
        }
    }
}

/// Result of running a single test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub status: TestStatus,
    pub duration: Duration,
    /// Skip reason or setup error
    pub message: Option<String>,
    pub failure: Option<FailureDiagnostic>,
}

impl TestResult {
    fn new(name: &str, status: TestStatus, duration: Duration) -> Self {
        Self {
            name: name.to_string(),
            status,
            duration,
            message: None,
            failure: None,
        }
    }

    fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn passed(&self) -> bool {
        self.status == TestStatus::Passed
    }
}

/// Summary of running a test suite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub suite_name: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errored: usize,
    pub results: Vec<TestResult>,
}

impl SuiteResult {
    pub fn new(suite_name: impl Into<String>, results: Vec<TestResult>) -> Self {
        let count = |status| results.iter().filter(|r| r.status == status).count();
        Self {
            suite_name: suite_name.into(),
            total: results.len(),
            passed: count(TestStatus::Passed),
            failed: count(TestStatus::Failed),
            skipped: count(TestStatus::Skipped),
            errored: count(TestStatus::Errored),
            results,
        }
    }

    /// Process exit code: non-zero when any test failed or errored
    pub fn exit_code(&self) -> i32 {
        if self.failed + self.errored > 0 { 1 } else { 0 }
    }

    /// Percentage of tests that passed
    pub fn pass_rate(&self) -> f64 {
        if self.total > 0 {
            self.passed as f64 / self.total as f64 * 100.0
        } else {
            0.0
        }
    }

    pub fn result(&self, name: &str) -> Option<&TestResult> {
        self.results.iter().find(|r| r.name == name)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Why a test could not reach its own query
enum SetupFault {
    Harness(HarnessError),
    /// A binding or context query failed; this becomes the test's outcome
    Query(QueryError),
}

impl From<HarnessError> for SetupFault {
    fn from(error: HarnessError) -> Self {
        Self::Harness(error)
    }
}

/// Runs test suites against an engine
pub struct SuiteRunner<'e> {
    engine: &'e dyn QueryEngine,
    fixtures: Option<&'e dyn FixtureLoader>,
    config: RunnerConfig,
}

impl<'e> SuiteRunner<'e> {
    pub fn new(engine: &'e dyn QueryEngine) -> Self {
        Self {
            engine,
            fixtures: None,
            config: RunnerConfig::default(),
        }
    }

    pub fn with_fixtures(mut self, fixtures: &'e dyn FixtureLoader) -> Self {
        self.fixtures = Some(fixtures);
        self
    }

    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run every selected test of a suite; results keep the suite's order
    pub fn run_suite(&self, suite: &TestSuite) -> SuiteResult {
        let selected: Vec<&TestCase> = suite
            .test_cases
            .iter()
            .filter(|t| self.config.selects(&t.name))
            .collect();
        debug!(
            "running suite {}: {} of {} tests selected",
            suite.name,
            selected.len(),
            suite.len()
        );

        let result = SuiteResult::new(suite.name.clone(), self.run_all(&selected));
        info!(
            "suite {}: {} passed, {} failed, {} errored, {} skipped ({:.1}%)",
            result.suite_name,
            result.passed,
            result.failed,
            result.errored,
            result.skipped,
            result.pass_rate()
        );
        result
    }

    #[cfg(feature = "parallel")]
    fn run_all(&self, tests: &[&TestCase]) -> Vec<TestResult> {
        if self.config.parallel {
            tests.par_iter().map(|test| self.run_test(test)).collect()
        } else {
            tests.iter().map(|test| self.run_test(test)).collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn run_all(&self, tests: &[&TestCase]) -> Vec<TestResult> {
        tests.iter().map(|test| self.run_test(test)).collect()
    }

    /// Run a single test case
    pub fn run_test(&self, test: &TestCase) -> TestResult {
        let start = Instant::now();

        if let Some(dependency) = test
            .dependencies
            .iter()
            .find(|d| self.config.capabilities.supports(&d.feature) != d.satisfied)
        {
            let reason = if dependency.satisfied {
                format!("requires unsupported feature {}", dependency.feature)
            } else {
                format!("not applicable when {} is supported", dependency.feature)
            };
            debug!("skipping {}: {}", test.name, reason);
            return TestResult::new(&test.name, TestStatus::Skipped, start.elapsed())
                .with_message(reason);
        }

        let harness = Harness::new(self.engine);
        let query = match self.query_text(test) {
            Ok(query) => query,
            Err(error) => return errored(test, error, start),
        };
        let outcome = match self.build_request(test, &query, harness) {
            Ok(request) => harness.run(&request),
            Err(SetupFault::Query(error)) => ExecutionOutcome::Failure(error),
            Err(SetupFault::Harness(error)) => return errored(test, error, start),
        };

        let evaluator = Evaluator::new(harness)
            .with_environment(Arc::clone(&test.environment))
            .with_options(self.config.evaluator);
        match evaluator.check(&test.assertion, &outcome) {
            Ok(()) => TestResult::new(&test.name, TestStatus::Passed, start.elapsed()),
            Err(mismatch) => {
                debug!("{} failed: {}", test.name, mismatch);
                let mut result = TestResult::new(&test.name, TestStatus::Failed, start.elapsed());
                result.failure = Some(FailureDiagnostic::new(&query, &outcome, &mismatch));
                result
            }
        }
    }

    fn query_text(&self, test: &TestCase) -> Result<String, HarnessError> {
        match &test.query {
            QuerySource::Inline(text) => Ok(text.clone()),
            QuerySource::File(path) => self.loader()?.load_query_text(path),
        }
    }

    fn build_request(
        &self,
        test: &TestCase,
        query: &str,
        harness: Harness<'_>,
    ) -> Result<QueryRequest, SetupFault> {
        let mut request = QueryRequest::new(query).with_environment(Arc::clone(&test.environment));

        if let Some(source) = &test.context {
            let value = self.resolve(source, &test.environment, harness)?;
            request.context_item = context_item(value)?;
        }
        for (name, source) in &test.bindings {
            debug!("resolving ${} for {}", name, test.name);
            let value = self.resolve(source, &test.environment, harness)?;
            request = request.bind(name.clone(), value);
        }
        Ok(request)
    }

    fn resolve(
        &self,
        source: &ValueSource,
        environment: &Arc<QueryEnvironment>,
        harness: Harness<'_>,
    ) -> Result<Sequence, SetupFault> {
        match source {
            ValueSource::Literal(sequence) => Ok(sequence.clone()),
            ValueSource::Document(path) => {
                let document = self.loader()?.load_document(path)?;
                Ok(Sequence::one(document))
            }
            ValueSource::Query(text) => {
                let request = QueryRequest::new(text.clone()).with_environment(Arc::clone(environment));
                match harness.run(&request) {
                    ExecutionOutcome::Success(sequence) => Ok(sequence),
                    ExecutionOutcome::Failure(error) => Err(SetupFault::Query(error)),
                }
            }
        }
    }

    fn loader(&self) -> Result<&'e dyn FixtureLoader, HarnessError> {
        self.fixtures
            .ok_or_else(|| HarnessError::config("test refers to a fixture but no fixture loader is set"))
    }
}

fn context_item(value: Sequence) -> Result<Option<Item>, HarnessError> {
    match value.len() {
        0 => Ok(None),
        1 => Ok(value.into_iter().next()),
        n => Err(HarnessError::config(format!(
            "context value must be a single item, found {}",
            n
        ))),
    }
}

fn errored(test: &TestCase, error: HarnessError, start: Instant) -> TestResult {
    debug!("{} errored: {}", test.name, error);
    TestResult::new(&test.name, TestStatus::Errored, start.elapsed())
        .with_message(format!("[{}] {}", error.code(), error))
}
