//! Qualified names

use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace bound to the reserved `xml` prefix
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// XML Schema namespace, conventionally bound to `xs`
pub const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// A name with an optional namespace URI and prefix
///
/// Two names are equal when their namespace and local part match; the prefix is
/// carried for serialization only.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct QName {
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    pub local: String,
}

impl QName {
    /// A name in no namespace
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            prefix: None,
            local: local.into(),
        }
    }

    /// A name in a namespace, written without a prefix
    pub fn namespaced(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            prefix: None,
            local: local.into(),
        }
    }

    /// A name in a namespace, written with a prefix
    pub fn prefixed(
        prefix: impl Into<String>,
        namespace: impl Into<String>,
        local: impl Into<String>,
    ) -> Self {
        Self {
            namespace: Some(namespace.into()),
            prefix: Some(prefix.into()),
            local: local.into(),
        }
    }

    /// Split a lexical `prefix:local` name without resolving the prefix
    pub fn split_lexical(lexical: &str) -> (Option<&str>, &str) {
        match lexical.split_once(':') {
            Some((prefix, local)) => (Some(prefix), local),
            None => (None, lexical),
        }
    }

    /// Namespace URI, or the empty string when the name is in no namespace
    pub fn namespace_uri(&self) -> &str {
        self.namespace.as_deref().unwrap_or("")
    }
}

impl PartialEq for QName {
    fn eq(&self, other: &Self) -> bool {
        self.local == other.local && self.namespace_uri() == other.namespace_uri()
    }
}

impl std::hash::Hash for QName {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.namespace_uri().hash(state);
        self.local.hash(state);
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) if !prefix.is_empty() => write!(f, "{}:{}", prefix, self.local),
            _ => f.write_str(&self.local),
        }
    }
}
