//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! claims scrubbing test suite.
//!
//! # Modules
//!
//! - `fixtures`: Reference tables, coverages and canned claims
//! - `builders`: Builder patterns for claims and lines
//! - `assertions`: Assertion helpers for findings and changes
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
