//! Diagnostics for the XQuery conformance harness
//!
//! This crate provides the error handling infrastructure shared by the harness crates:
//! namespace-qualified error codes, the fault type surfaced by query engines, setup
//! errors raised while preparing test cases, and human-readable failure diagnostics.

mod diagnostic;
mod error;
mod error_code;

pub use diagnostic::*;
pub use error::*;
pub use error_code::*;

/// Result type for harness setup operations
pub type Result<T> = std::result::Result<T, HarnessError>;
