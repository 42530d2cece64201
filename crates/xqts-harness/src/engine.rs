//! The query engine collaborator
//!
//! The harness treats the engine as a black box: it compiles a request into a
//! prepared query, executes it once, and closes it. Engines must tolerate concurrent
//! `prepare` calls from different test cases; nothing about one request may leak into
//! another.

use crate::environment::QueryEnvironment;
use indexmap::IndexMap;
use std::sync::Arc;
use xqts_diagnostics::QueryError;
use xqts_xdm::{Item, Sequence};

/// Everything the engine needs to compile and run one query
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    /// Query text
    pub query: String,
    /// Initial context item
    pub context_item: Option<Item>,
    /// External variable values, in declaration order
    pub bindings: IndexMap<String, Sequence>,
    /// Static and dynamic environment
    pub environment: Arc<QueryEnvironment>,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_context_item(mut self, item: impl Into<Item>) -> Self {
        self.context_item = Some(item.into());
        self
    }

    /// Bind an external variable; the name is given without `$`
    pub fn bind(mut self, name: impl Into<String>, value: Sequence) -> Self {
        self.bindings.insert(name.into(), value);
        self
    }

    pub fn with_environment(mut self, environment: Arc<QueryEnvironment>) -> Self {
        self.environment = environment;
        self
    }

    pub fn binding(&self, name: &str) -> Option<&Sequence> {
        self.bindings.get(name)
    }
}

/// A query engine
pub trait QueryEngine: Send + Sync {
    /// Compile a query
    ///
    /// Static errors are reported here; the returned handle holds whatever engine
    /// resources the compiled query needs until it is closed.
    fn prepare<'e>(
        &'e self,
        request: &QueryRequest,
    ) -> Result<Box<dyn PreparedQuery + 'e>, QueryError>;
}

/// A compiled query holding engine resources
pub trait PreparedQuery {
    /// Evaluate the query to a sequence
    fn execute(&mut self) -> Result<Sequence, QueryError>;

    /// Release engine resources; called exactly once by the harness
    fn close(&mut self);
}

impl<E: QueryEngine + ?Sized> QueryEngine for Arc<E> {
    fn prepare<'e>(
        &'e self,
        request: &QueryRequest,
    ) -> Result<Box<dyn PreparedQuery + 'e>, QueryError> {
        (**self).prepare(request)
    }
}
