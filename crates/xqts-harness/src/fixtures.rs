//! Fixture loading
//!
//! Test cases refer to context documents and query files by path. Resolving those
//! paths is delegated to a [`FixtureLoader`]; the harness never touches the file
//! system itself.

use indexmap::IndexMap;
use xqts_diagnostics::{HarnessError, Result};
use xqts_xdm::{Node, parse_document};

/// Resolves fixture paths to documents and query text
pub trait FixtureLoader: Send + Sync {
    /// Load a document node
    ///
    /// Every call returns a tree with fresh node identities, so tests sharing a
    /// fixture never observe each other's nodes.
    fn load_document(&self, path: &str) -> Result<Node>;

    /// Load the text of a query file
    fn load_query_text(&self, path: &str) -> Result<String>;
}

/// Fixtures held in memory as source text
#[derive(Debug, Clone, Default)]
pub struct InMemoryFixtures {
    documents: IndexMap<String, String>,
    queries: IndexMap<String, String>,
}

impl InMemoryFixtures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, path: impl Into<String>, xml: impl Into<String>) -> Self {
        self.add_document(path, xml);
        self
    }

    pub fn with_query(mut self, path: impl Into<String>, query: impl Into<String>) -> Self {
        self.add_query(path, query);
        self
    }

    pub fn add_document(&mut self, path: impl Into<String>, xml: impl Into<String>) {
        self.documents.insert(path.into(), xml.into());
    }

    pub fn add_query(&mut self, path: impl Into<String>, query: impl Into<String>) {
        self.queries.insert(path.into(), query.into());
    }
}

impl FixtureLoader for InMemoryFixtures {
    fn load_document(&self, path: &str) -> Result<Node> {
        let xml = self
            .documents
            .get(path)
            .ok_or_else(|| HarnessError::fixture_not_found(path))?;
        parse_document(xml).map_err(|e| HarnessError::invalid_fixture(path, e.to_string()))
    }

    fn load_query_text(&self, path: &str) -> Result<String> {
        self.queries
            .get(path)
            .cloned()
            .ok_or_else(|| HarnessError::fixture_not_found(path))
    }
}
