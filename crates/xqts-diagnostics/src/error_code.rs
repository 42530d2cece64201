//! Namespace-qualified error codes
//!
//! Engine error codes are QNames in the W3C error namespace. Their local names follow a
//! structured scheme:
//! - XPST/XQST: static errors (syntax, unresolved names)
//! - XPDY/XQDY: dynamic errors
//! - XPTY/XQTY: type errors
//! - SE..: serialization errors
//! - FO..: function and operator errors
//!
//! Codes in the harness namespace (`XQTS....`) are raised by the harness itself.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

/// Namespace of the standard XQuery/XPath error codes
pub const ERROR_NAMESPACE: &str = "http://www.w3.org/2005/xqt-errors";

/// Namespace of codes raised by the harness rather than the engine
pub const HARNESS_NAMESPACE: &str = "urn:xqts:harness-errors";

/// Error code identifier
///
/// Equality and hashing ignore the prefix: `err:XPST0003` and
/// `Q{http://www.w3.org/2005/xqt-errors}XPST0003` are the same code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorCode {
    namespace: Option<String>,
    prefix: Option<String>,
    local: String,
}

impl ErrorCode {
    /// Create a code in the standard error namespace
    pub fn new(local: impl Into<String>) -> Self {
        Self {
            namespace: Some(ERROR_NAMESPACE.to_string()),
            prefix: None,
            local: local.into(),
        }
    }

    /// Create a code in an explicit namespace
    pub fn with_namespace(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            prefix: None,
            local: local.into(),
        }
    }

    /// Create a code raised by the harness
    pub fn harness(local: impl Into<String>) -> Self {
        Self::with_namespace(HARNESS_NAMESPACE, local)
    }

    /// Parse a code written as `local`, `prefix:local` or `Q{uri}local`
    ///
    /// Unprefixed and `err:`-prefixed codes land in the standard error namespace.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(rest) = text.strip_prefix("Q{") {
            if let Some((uri, local)) = rest.split_once('}') {
                return Self {
                    namespace: (!uri.is_empty()).then(|| uri.to_string()),
                    prefix: None,
                    local: local.to_string(),
                };
            }
        }
        match text.split_once(':') {
            Some((prefix, local)) => Self {
                namespace: (prefix == "err").then(|| ERROR_NAMESPACE.to_string()),
                prefix: Some(prefix.to_string()),
                local: local.to_string(),
            },
            None => Self::new(text),
        }
    }

    /// Local name of the code, e.g. `XPST0003`
    pub fn local_name(&self) -> &str {
        &self.local
    }

    /// Namespace URI, if known
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Prefix the code was written with, if any
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Check whether this code satisfies an expected code
    ///
    /// Only local names are compared. The expected code `*` matches everything.
    pub fn matches(&self, expected: &str) -> bool {
        let expected = expected.trim();
        expected == "*" || Self::parse(expected).local == self.local
    }

    /// Classify the code by its local-name scheme
    pub fn category(&self) -> ErrorCategory {
        if self.namespace.as_deref() == Some(HARNESS_NAMESPACE) {
            return ErrorCategory::Harness;
        }
        let local = self.local.as_str();
        match local.get(..4) {
            Some("XPST" | "XQST") => ErrorCategory::Static,
            Some("XPDY" | "XQDY") => ErrorCategory::Dynamic,
            Some("XPTY" | "XQTY") => ErrorCategory::Type,
            _ if local.starts_with("SE") => ErrorCategory::Serialization,
            _ if local.starts_with("FO") => ErrorCategory::Function,
            _ => ErrorCategory::Implementation,
        }
    }

    /// Get descriptive information for well-known codes
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(self.local.as_str()).unwrap_or(&UNKNOWN_ERROR)
    }
}

impl PartialEq for ErrorCode {
    fn eq(&self, other: &Self) -> bool {
        self.local == other.local && self.namespace == other.namespace
    }
}

impl Eq for ErrorCode {}

impl Hash for ErrorCode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
        self.local.hash(state);
    }
}

impl From<&str> for ErrorCode {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.prefix, &self.namespace) {
            (Some(prefix), _) => write!(f, "{}:{}", prefix, self.local),
            (None, Some(ns)) if ns != ERROR_NAMESPACE => write!(f, "Q{{{}}}{}", ns, self.local),
            _ => f.write_str(&self.local),
        }
    }
}

/// Broad class of an error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Detected before evaluation (syntax, unresolved names)
    Static,
    /// Raised during evaluation
    Dynamic,
    /// Type errors, static or dynamic
    Type,
    /// Raised while serializing a result
    Serialization,
    /// Raised by a built-in function or operator
    Function,
    /// Raised by the harness itself (e.g. an engine panic)
    Harness,
    /// Anything else, including vendor codes
    Implementation,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Static => "static",
            ErrorCategory::Dynamic => "dynamic",
            ErrorCategory::Type => "type",
            ErrorCategory::Serialization => "serialization",
            ErrorCategory::Function => "function",
            ErrorCategory::Harness => "harness",
            ErrorCategory::Implementation => "implementation-defined",
        };
        f.write_str(name)
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self { description }
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<&'static str, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Static errors
    map.insert(codes::XPST0003, ErrorInfo::new("Syntax error"));
    map.insert(codes::XPST0008, ErrorInfo::new("Undefined name"));
    map.insert(codes::XPST0017, ErrorInfo::new("Unknown function or wrong arity"));
    map.insert(codes::XPST0051, ErrorInfo::new("Unknown atomic type"));
    map.insert(codes::XPST0081, ErrorInfo::new("Unbound namespace prefix"));
    map.insert(codes::XQST0040, ErrorInfo::new("Duplicate attribute name"));
    map.insert(codes::XQST0118, ErrorInfo::new("Mismatched element end tag"));

    // Type errors
    map.insert(codes::XPTY0004, ErrorInfo::new("Type mismatch"));
    map.insert(codes::XPTY0019, ErrorInfo::new("Path step applied to an atomic value"));

    // Dynamic errors
    map.insert(codes::XPDY0002, ErrorInfo::new("Context item is absent"));
    map.insert(codes::XPDY0050, ErrorInfo::new("Treat expression failed"));
    map.insert(codes::XQDY0025, ErrorInfo::new("Duplicate attribute in constructed element"));
    map.insert(codes::XQDY0091, ErrorInfo::new("Invalid xml:id value"));

    // Function and operator errors
    map.insert(codes::FOAR0001, ErrorInfo::new("Division by zero"));
    map.insert(codes::FOAR0002, ErrorInfo::new("Numeric overflow or underflow"));
    map.insert(codes::FOCA0002, ErrorInfo::new("Invalid lexical value"));
    map.insert(codes::FODC0002, ErrorInfo::new("Error retrieving resource"));
    map.insert(codes::FODC0006, ErrorInfo::new("Document is not well-formed"));
    map.insert(codes::FOER0000, ErrorInfo::new("Unidentified error"));
    map.insert(codes::FORG0001, ErrorInfo::new("Invalid value for cast or constructor"));
    map.insert(codes::FORG0006, ErrorInfo::new("Invalid argument type"));
    map.insert(codes::FORX0001, ErrorInfo::new("Invalid regular expression flags"));
    map.insert(codes::FORX0002, ErrorInfo::new("Invalid regular expression"));

    // Serialization errors
    map.insert(codes::SENR0001, ErrorInfo::new("Attribute or namespace node cannot be serialized"));
    map.insert(codes::SEPM0004, ErrorInfo::new("Document with several roots cannot carry a doctype"));

    // Harness errors
    map.insert(codes::XQTS0001, ErrorInfo::new("Engine panicked"));
    map.insert(codes::XQTS0002, ErrorInfo::new("Test environment could not be set up"));

    map
});

/// Local names of frequently used codes
pub mod codes {
    pub const XPST0003: &str = "XPST0003";
    pub const XPST0008: &str = "XPST0008";
    pub const XPST0017: &str = "XPST0017";
    pub const XPST0051: &str = "XPST0051";
    pub const XPST0081: &str = "XPST0081";
    pub const XQST0040: &str = "XQST0040";
    pub const XQST0118: &str = "XQST0118";
    pub const XPTY0004: &str = "XPTY0004";
    pub const XPTY0019: &str = "XPTY0019";
    pub const XPDY0002: &str = "XPDY0002";
    pub const XPDY0050: &str = "XPDY0050";
    pub const XQDY0025: &str = "XQDY0025";
    pub const XQDY0091: &str = "XQDY0091";
    pub const FOAR0001: &str = "FOAR0001";
    pub const FOAR0002: &str = "FOAR0002";
    pub const FOCA0002: &str = "FOCA0002";
    pub const FODC0002: &str = "FODC0002";
    pub const FODC0006: &str = "FODC0006";
    pub const FOER0000: &str = "FOER0000";
    pub const FORG0001: &str = "FORG0001";
    pub const FORG0006: &str = "FORG0006";
    pub const FORX0001: &str = "FORX0001";
    pub const FORX0002: &str = "FORX0002";
    pub const SENR0001: &str = "SENR0001";
    pub const SEPM0004: &str = "SEPM0004";
    pub const XQTS0001: &str = "XQTS0001";
    pub const XQTS0002: &str = "XQTS0002";
}
