//! Core Kernel - Foundational types shared by the claims scrubbing engine
//!
//! This crate provides the building blocks used by the claims domain:
//! - Strongly-typed identifiers for claims, lines, patients and coverages
//! - Lenient decimals that keep malformed input instead of rejecting it
//! - Normalization and validation of billing codes (CPT, modifiers, POS)

pub mod identifiers;
pub mod numeric;
pub mod codes;
pub mod error;

pub use identifiers::{ClaimId, ClaimLineId, PatientId, CoverageId};
pub use numeric::{LenientDecimal, parse_decimal};
pub use codes::{normalize_code, require_code, OFFICE_POS};
pub use error::CoreError;
