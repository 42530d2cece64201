//! Error types shared by the harness crates

use crate::{codes, ErrorCategory, ErrorCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A fault raised by a query engine while compiling or evaluating a query
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct QueryError {
    /// Namespace-qualified error code
    pub code: ErrorCode,
    /// Engine-provided message
    pub message: String,
}

impl QueryError {
    /// Create a new engine fault
    pub fn new(code: impl Into<ErrorCode>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Fault recorded when the engine panicked instead of reporting an error
    pub fn engine_panic(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::harness(codes::XQTS0001),
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> &ErrorCode {
        &self.code
    }

    /// Get the message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Classify the fault
    pub fn category(&self) -> ErrorCategory {
        self.code.category()
    }
}

/// Errors raised while setting up a test case
#[derive(Debug, Clone, Error)]
pub enum HarnessError {
    /// A referenced fixture file is unknown to the loader
    #[error("fixture not found: {path}")]
    FixtureNotFound { path: String },

    /// A fixture document is not well-formed
    #[error("invalid fixture document {path}: {message}")]
    InvalidFixture { path: String, message: String },

    /// A test case refers to an environment that was never defined
    #[error("unknown environment '{name}'")]
    UnknownEnvironment { name: String },

    /// Configuration could not be read
    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl HarnessError {
    /// Create a fixture-not-found error
    pub fn fixture_not_found(path: impl Into<String>) -> Self {
        Self::FixtureNotFound { path: path.into() }
    }

    /// Create an invalid-fixture error
    pub fn invalid_fixture(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidFixture {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get the error code that best describes this setup fault
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::FixtureNotFound { .. } => ErrorCode::new(codes::FODC0002),
            Self::InvalidFixture { .. } => ErrorCode::new(codes::FODC0006),
            Self::UnknownEnvironment { .. } | Self::Config { .. } => {
                ErrorCode::harness(codes::XQTS0002)
            }
        }
    }
}
