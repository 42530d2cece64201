//! Test case definitions

use crate::assertion::Assertion;
use crate::environment::QueryEnvironment;
use indexmap::IndexMap;
use std::sync::Arc;
use xqts_xdm::Sequence;

/// Where a test's query text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySource {
    Inline(String),
    /// A query file resolved through the fixture loader
    File(String),
}

/// How a context item or variable binding is obtained
#[derive(Debug, Clone)]
pub enum ValueSource {
    Literal(Sequence),
    /// A fixture document, loaded fresh for every run
    Document(String),
    /// A query evaluated before the test query
    Query(String),
}

/// A feature the test depends on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub feature: String,
    /// Whether the feature must be supported (true) or unsupported (false)
    pub satisfied: bool,
}

impl Dependency {
    pub fn requires(feature: impl Into<String>) -> Self {
        Self {
            feature: feature.into(),
            satisfied: true,
        }
    }

    pub fn excludes(feature: impl Into<String>) -> Self {
        Self {
            feature: feature.into(),
            satisfied: false,
        }
    }
}

/// One conformance test
///
/// Built once and never mutated while running.
#[derive(Debug, Clone)]
pub struct TestCase {
    pub name: String,
    pub description: Option<String>,
    pub query: QuerySource,
    pub context: Option<ValueSource>,
    /// External variables, by name without `$`
    pub bindings: IndexMap<String, ValueSource>,
    pub environment: Arc<QueryEnvironment>,
    pub dependencies: Vec<Dependency>,
    pub assertion: Assertion,
}

impl TestCase {
    pub fn new(name: impl Into<String>, query: impl Into<String>, assertion: Assertion) -> Self {
        Self {
            name: name.into(),
            description: None,
            query: QuerySource::Inline(query.into()),
            context: None,
            bindings: IndexMap::new(),
            environment: Arc::default(),
            dependencies: Vec::new(),
            assertion,
        }
    }

    /// A test whose query text lives in a fixture file
    pub fn from_file(name: impl Into<String>, path: impl Into<String>, assertion: Assertion) -> Self {
        Self {
            query: QuerySource::File(path.into()),
            ..Self::new(name, String::new(), assertion)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_context(mut self, context: ValueSource) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_context_document(self, path: impl Into<String>) -> Self {
        self.with_context(ValueSource::Document(path.into()))
    }

    pub fn bind(mut self, name: impl Into<String>, value: ValueSource) -> Self {
        self.bindings.insert(name.into(), value);
        self
    }

    pub fn with_environment(mut self, environment: Arc<QueryEnvironment>) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// The inline query text, if the query is not in a file
    pub fn inline_query(&self) -> Option<&str> {
        match &self.query {
            QuerySource::Inline(text) => Some(text),
            QuerySource::File(_) => None,
        }
    }
}

/// A named group of test cases
#[derive(Debug, Clone, Default)]
pub struct TestSuite {
    pub name: String,
    pub test_cases: Vec<TestCase>,
}

impl TestSuite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            test_cases: Vec::new(),
        }
    }

    pub fn with_test(mut self, test: TestCase) -> Self {
        self.test_cases.push(test);
        self
    }

    pub fn len(&self) -> usize {
        self.test_cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.test_cases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let test = TestCase::new("K-Add-1", "1 + 1", Assertion::eq("2"))
            .with_description("simple addition")
            .with_context_document("docs/works.xml")
            .bind("x", ValueSource::Query("1 to 3".into()))
            .with_dependency(Dependency::requires("XQuery 1.0"));
        assert_eq!(test.inline_query(), Some("1 + 1"));
        assert!(matches!(test.context, Some(ValueSource::Document(ref p)) if p == "docs/works.xml"));
        assert_eq!(test.bindings.len(), 1);
        assert!(test.dependencies[0].satisfied);
    }

    #[test]
    fn test_from_file() {
        let test = TestCase::from_file("q1", "queries/q1.xq", Assertion::IsEmpty);
        assert_eq!(test.query, QuerySource::File("queries/q1.xq".into()));
        assert_eq!(test.inline_query(), None);
    }

    #[test]
    fn test_suite() {
        let suite = TestSuite::new("arith")
            .with_test(TestCase::new("a", "1", Assertion::eq("1")))
            .with_test(TestCase::new("b", "2", Assertion::eq("2")));
        assert_eq!(suite.len(), 2);
        assert_eq!(suite.test_cases[1].name, "b");
    }
}
