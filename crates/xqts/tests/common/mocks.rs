//! Mock query engine for testing
//!
//! `ScriptedEngine` answers queries from a table keyed by query text. It counts
//! compile and close calls and logs every query it prepares, so tests can observe
//! short-circuiting, nested runs and resource release.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use xqts::harness::{PreparedQuery, QueryEngine, QueryRequest, RESULT_VARIABLE_PROLOG};
use xqts::{QueryError, Sequence};

type Handler = Arc<dyn Fn(&QueryRequest) -> Result<Sequence, QueryError> + Send + Sync>;

/// How the mock answers one query
#[derive(Clone)]
pub enum Script {
    /// Evaluate to a fixed sequence
    Return(Sequence),
    /// Compile, then raise a dynamic error
    Fail(String, String),
    /// Raise a static error while compiling
    CompileFail(String, String),
    /// Compile, then panic during evaluation
    Panic(String),
    /// Return the value bound to this variable
    Binding(String),
    /// Return the context item
    ContextItem,
    /// Compute the answer from the request
    Compute(Handler),
}

#[derive(Default)]
struct Counters {
    prepared: usize,
    closed: usize,
}

/// Mock engine with configurable responses
pub struct ScriptedEngine {
    scripts: Arc<RwLock<HashMap<String, Script>>>,
    counters: Arc<Mutex<Counters>>,
    executed: Arc<Mutex<Vec<String>>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            scripts: Arc::new(RwLock::new(HashMap::new())),
            counters: Arc::new(Mutex::new(Counters::default())),
            executed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Configure the answer for a query; the `$result` prolog is ignored when matching
    pub fn script(&self, query: impl Into<String>, script: Script) -> &Self {
        self.scripts.write().insert(query.into(), script);
        self
    }

    pub fn returns(&self, query: impl Into<String>, value: Sequence) -> &Self {
        self.script(query, Script::Return(value))
    }

    pub fn fails(&self, query: impl Into<String>, code: &str, message: &str) -> &Self {
        self.script(query, Script::Fail(code.into(), message.into()))
    }

    pub fn compute<F>(&self, query: impl Into<String>, handler: F) -> &Self
    where
        F: Fn(&QueryRequest) -> Result<Sequence, QueryError> + Send + Sync + 'static,
    {
        self.script(query, Script::Compute(Arc::new(handler)))
    }

    /// Number of `prepare` calls, successful or not
    pub fn prepared(&self) -> usize {
        self.counters.lock().prepared
    }

    /// Number of `close` calls
    pub fn closed(&self) -> usize {
        self.counters.lock().closed
    }

    /// Query bodies in the order they were prepared
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().clone()
    }

    pub fn reset_counts(&self) {
        *self.counters.lock() = Counters::default();
        self.executed.lock().clear();
    }
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryEngine for ScriptedEngine {
    fn prepare<'e>(
        &'e self,
        request: &QueryRequest,
    ) -> Result<Box<dyn PreparedQuery + 'e>, QueryError> {
        let body = request
            .query
            .strip_prefix(RESULT_VARIABLE_PROLOG)
            .unwrap_or(&request.query)
            .to_string();
        self.counters.lock().prepared += 1;
        self.executed.lock().push(body.clone());

        let script = self.scripts.read().get(&body).cloned();
        let answer = match script {
            None => {
                return Err(QueryError::new(
                    "XPST0003",
                    format!("no script for query: {}", body),
                ));
            }
            Some(Script::CompileFail(code, message)) => {
                return Err(QueryError::new(code.as_str(), message));
            }
            Some(Script::Return(sequence)) => Answer::Value(Ok(sequence)),
            Some(Script::Fail(code, message)) => {
                Answer::Value(Err(QueryError::new(code.as_str(), message)))
            }
            Some(Script::Panic(message)) => Answer::Panic(message),
            Some(Script::Binding(name)) => Answer::Value(
                request
                    .binding(&name)
                    .cloned()
                    .ok_or_else(|| QueryError::new("XPST0008", format!("${} is unbound", name))),
            ),
            Some(Script::ContextItem) => Answer::Value(
                request
                    .context_item
                    .clone()
                    .map(Sequence::one)
                    .ok_or_else(|| QueryError::new("XPDY0002", "context item is absent")),
            ),
            Some(Script::Compute(handler)) => Answer::Value(handler(request)),
        };
        Ok(Box::new(ScriptedQuery {
            counters: Arc::clone(&self.counters),
            answer,
        }))
    }
}

enum Answer {
    Value(Result<Sequence, QueryError>),
    Panic(String),
}

struct ScriptedQuery {
    counters: Arc<Mutex<Counters>>,
    answer: Answer,
}

impl PreparedQuery for ScriptedQuery {
    fn execute(&mut self) -> Result<Sequence, QueryError> {
        match &self.answer {
            Answer::Value(value) => value.clone(),
            Answer::Panic(message) => panic!("{}", message),
        }
    }

    fn close(&mut self) {
        self.counters.lock().closed += 1;
    }
}
