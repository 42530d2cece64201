//! Static and dynamic context shared by the queries of one test case

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use xqts_xdm::{Node, Sequence};

/// Language level the engine should compile a query for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageVersion {
    /// XQuery 1.0 compatibility mode
    XQuery10,
    XQuery30,
    #[default]
    XQuery31,
}

impl fmt::Display for LanguageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::XQuery10 => write!(f, "XQuery 1.0"),
            Self::XQuery30 => write!(f, "XQuery 3.0"),
            Self::XQuery31 => write!(f, "XQuery 3.1"),
        }
    }
}

/// Environment a query runs in
///
/// One environment is shared (behind an `Arc`) by the main query of a test case and
/// every nested query its assertions run, so they all see the same documents,
/// collections and namespace bindings.
#[derive(Debug, Clone, Default)]
pub struct QueryEnvironment {
    /// Environment name, for diagnostics
    pub name: Option<String>,
    /// Statically known namespaces (prefix -> URI)
    pub namespaces: IndexMap<String, String>,
    /// Static base URI
    pub base_uri: Option<String>,
    /// Library modules (namespace URI -> location)
    pub modules: IndexMap<String, String>,
    /// Available documents (URI -> document node)
    pub documents: IndexMap<String, Node>,
    /// Available collections (URI -> items)
    pub collections: IndexMap<String, Sequence>,
    /// Language level
    pub language: LanguageVersion,
    /// Free-form engine options
    pub options: IndexMap<String, String>,
}

impl QueryEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.insert(prefix.into(), uri.into());
        self
    }

    pub fn with_base_uri(mut self, uri: impl Into<String>) -> Self {
        self.base_uri = Some(uri.into());
        self
    }

    pub fn with_module(mut self, uri: impl Into<String>, location: impl Into<String>) -> Self {
        self.modules.insert(uri.into(), location.into());
        self
    }

    pub fn with_document(mut self, uri: impl Into<String>, document: Node) -> Self {
        self.documents.insert(uri.into(), document);
        self
    }

    pub fn with_collection(mut self, uri: impl Into<String>, items: Sequence) -> Self {
        self.collections.insert(uri.into(), items);
        self
    }

    pub fn with_language(mut self, language: LanguageVersion) -> Self {
        self.language = language;
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }
}
