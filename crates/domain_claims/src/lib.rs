//! Claims Scrubbing Domain
//!
//! This crate evaluates professional claims against billing-compliance rules
//! and proposes corrections. It holds no storage: claims and reference tables
//! are passed in as plain values and mutated in place.
//!
//! # Scrub and Fix Cycle
//!
//! ```text
//! scrub -> propose_changes -> caller approval -> apply_changes -> scrub
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_claims::{scrub, propose_changes, apply_changes, AutofixFlags};
//!
//! let findings = scrub(&mut claim, &reference);
//! let proposed = propose_changes(&mut claim, &reference, &coverages, &AutofixFlags::default());
//! let committed = apply_changes(&mut claim, &proposed, &reference);
//! ```

pub mod claim;
pub mod finding;
pub mod reference;
pub mod scrubber;
pub mod autofix;
pub mod payer_rules;
pub mod workqueue;
pub mod config;
pub mod error;

pub use claim::{Claim, ClaimLine, Diagnosis, MAX_MODIFIERS, OFFICE_EM_RANGE};
pub use finding::{Finding, FindingCode, Severity, ScrubSummary};
pub use reference::{MueTable, NcciEdit, ReferenceData, Coverage, CoverageLookup, CoverageRegistry};
pub use scrubber::{scrub, evaluate};
pub use autofix::{Change, ClaimField, LineField, AutofixFlags, propose_changes, apply_changes};
pub use payer_rules::{PayerRule, RuleSet, RuleIssue, RuleScope, RuleSeverity, PatientContext};
pub use workqueue::{WorkqueueEntry, QueueItem, build_workqueue};
pub use config::EngineConfig;
pub use error::ClaimError;
