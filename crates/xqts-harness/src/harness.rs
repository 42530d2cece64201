//! Query execution harness
//!
//! Runs one query against the engine and always produces an [`ExecutionOutcome`].
//! Engine faults become `Failure`; so do engine panics, which are caught here and
//! reported with the harness code `XQTS0001`. The prepared query is closed on every
//! exit path, including unwinding.

use crate::engine::{PreparedQuery, QueryEngine, QueryRequest};
use crate::outcome::ExecutionOutcome;
use log::{debug, warn};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use xqts_diagnostics::QueryError;
use xqts_xdm::Sequence;

/// Prolog declaring the `$result` variable bound by nested assertion queries
pub const RESULT_VARIABLE_PROLOG: &str = "declare variable $result external;\n";

/// Runs queries against an engine
///
/// The harness holds no state besides the engine reference; every call to
/// [`Harness::run`] is an independent invocation, so it can be nested and shared
/// across threads.
#[derive(Clone, Copy)]
pub struct Harness<'e> {
    engine: &'e dyn QueryEngine,
}

impl<'e> Harness<'e> {
    pub fn new(engine: &'e dyn QueryEngine) -> Self {
        Self { engine }
    }

    /// Run a query to an outcome
    pub fn run(&self, request: &QueryRequest) -> ExecutionOutcome {
        debug!(
            "executing query ({} bindings, context item: {}): {}",
            request.bindings.len(),
            request.context_item.is_some(),
            first_line(&request.query)
        );

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.execute(request)));
        let outcome = match result {
            Ok(Ok(sequence)) => ExecutionOutcome::Success(sequence),
            Ok(Err(error)) => ExecutionOutcome::Failure(error),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!("engine panicked while running query: {}", message);
                ExecutionOutcome::Failure(QueryError::engine_panic(format!(
                    "engine panicked: {}",
                    message
                )))
            }
        };
        debug!("query finished: {}", outcome.summary());
        outcome
    }

    fn execute(&self, request: &QueryRequest) -> Result<Sequence, QueryError> {
        let mut prepared = PreparedGuard(self.engine.prepare(request)?);
        prepared.0.execute()
    }
}

impl std::fmt::Debug for Harness<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harness").finish_non_exhaustive()
    }
}

/// Closes the prepared query when dropped
struct PreparedGuard<'e>(Box<dyn PreparedQuery + 'e>);

impl Drop for PreparedGuard<'_> {
    fn drop(&mut self) {
        self.0.close();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn first_line(query: &str) -> &str {
    query.lines().find(|l| !l.trim().is_empty()).unwrap_or("")
}
