//! Common test utilities for harness testing
//!
//! - A scripted mock engine with call counters
//! - Outcome and node builders for the usual scenarios

#![allow(dead_code)]

pub mod mocks;
pub mod outcomes;

pub use mocks::*;
pub use outcomes::*;
