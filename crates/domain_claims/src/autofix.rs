//! Remediation engine
//!
//! Proposes structured changes that resolve specific finding codes and
//! applies a caller-approved subset of them.
//!
//! # Workflow
//!
//! ```text
//! propose_changes -> caller review -> apply_changes -> re-scrub
//! ```
//!
//! Proposals are plain values; nothing is mutated until [`apply_changes`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use core_kernel::{ClaimLineId, LenientDecimal, OFFICE_POS};
use crate::claim::Claim;
use crate::finding::FindingCode;
use crate::reference::{CoverageLookup, ReferenceData};
use crate::scrubber::scrub;

/// Claim header fields an auto-fix may change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimField {
    Pos,
    PayerName,
    TotalCharge,
}

/// Line fields an auto-fix may change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineField {
    Units,
}

/// A proposed correction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Change {
    /// Set a header field
    UpdateClaim {
        field: ClaimField,
        from: String,
        to: String,
        reason: String,
    },
    /// Set a field on one line
    UpdateLine {
        line_id: ClaimLineId,
        field: LineField,
        from: String,
        to: String,
        reason: String,
    },
    /// Remove a line
    DeleteLine {
        line_id: ClaimLineId,
        reason: String,
    },
}

impl Change {
    /// Why the change was proposed
    pub fn reason(&self) -> &str {
        match self {
            Change::UpdateClaim { reason, .. }
            | Change::UpdateLine { reason, .. }
            | Change::DeleteLine { reason, .. } => reason,
        }
    }

    /// Line the change targets, if any
    pub fn line_id(&self) -> Option<ClaimLineId> {
        match self {
            Change::UpdateClaim { .. } => None,
            Change::UpdateLine { line_id, .. } | Change::DeleteLine { line_id, .. } => Some(*line_id),
        }
    }
}

/// Per-finding switches for auto-fix proposals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutofixFlags {
    pub pos_conflict: bool,
    pub mue_exceeded: bool,
    pub ncci_pair: bool,
    pub required_payer_name: bool,
    pub total_charge_zero: bool,
}

impl Default for AutofixFlags {
    fn default() -> Self {
        Self {
            pos_conflict: true,
            mue_exceeded: true,
            ncci_pair: true,
            required_payer_name: true,
            total_charge_zero: true,
        }
    }
}

impl AutofixFlags {
    /// Flags with every fix turned off
    pub fn none() -> Self {
        Self {
            pos_conflict: false,
            mue_exceeded: false,
            ncci_pair: false,
            required_payer_name: false,
            total_charge_zero: false,
        }
    }

    /// Whether fixes for `code` may be proposed
    pub fn is_enabled(&self, code: FindingCode) -> bool {
        match code {
            FindingCode::PosConflict => self.pos_conflict,
            FindingCode::MueExceeded => self.mue_exceeded,
            FindingCode::NcciPair => self.ncci_pair,
            FindingCode::RequiredPayerName => self.required_payer_name,
            FindingCode::TotalChargeZero => self.total_charge_zero,
        }
    }

    /// Returns a copy with one fix switched
    pub fn with(mut self, code: FindingCode, enabled: bool) -> Self {
        let slot = match code {
            FindingCode::PosConflict => &mut self.pos_conflict,
            FindingCode::MueExceeded => &mut self.mue_exceeded,
            FindingCode::NcciPair => &mut self.ncci_pair,
            FindingCode::RequiredPayerName => &mut self.required_payer_name,
            FindingCode::TotalChargeZero => &mut self.total_charge_zero,
        };
        *slot = enabled;
        self
    }
}

/// Proposes changes that would resolve the claim's current findings
///
/// The claim is re-scrubbed first so its findings reflect current state.
///
/// # Arguments
///
/// * `claim` - The claim to inspect; only its findings are refreshed
/// * `reference` - MUE and NCCI tables
/// * `coverages` - Coverage source used to fill a missing payer name
/// * `flags` - Which fixes may be proposed
///
/// # Returns
///
/// Proposed changes in the order POS, MUE, NCCI, payer name, total charge
#[instrument(skip_all, fields(claim_id = %claim.id))]
pub fn propose_changes(
    claim: &mut Claim,
    reference: &ReferenceData,
    coverages: &dyn CoverageLookup,
    flags: &AutofixFlags,
) -> Vec<Change> {
    scrub(claim, reference);

    let mut changes = Vec::new();
    propose_pos_fix(claim, flags, &mut changes);
    propose_unit_caps(claim, reference, flags, &mut changes);
    propose_ncci_deletions(claim, reference, flags, &mut changes);
    propose_payer_name(claim, coverages, flags, &mut changes);
    propose_total_charge(claim, flags, &mut changes);

    debug!(count = changes.len(), "Proposed changes");
    changes
}

fn propose_pos_fix(claim: &Claim, flags: &AutofixFlags, changes: &mut Vec<Change>) {
    if !flags.is_enabled(FindingCode::PosConflict) || claim.is_office_pos() {
        return;
    }
    if claim.lines.iter().any(|l| l.is_office_em()) {
        changes.push(Change::UpdateClaim {
            field: ClaimField::Pos,
            from: claim.pos.clone(),
            to: OFFICE_POS.to_string(),
            reason: FindingCode::PosConflict.to_string(),
        });
    }
}

fn propose_unit_caps(
    claim: &Claim,
    reference: &ReferenceData,
    flags: &AutofixFlags,
    changes: &mut Vec<Change>,
) {
    if !flags.is_enabled(FindingCode::MueExceeded) {
        return;
    }
    for line in &claim.lines {
        let (Some(limit), Some(units)) = (reference.mue.limit_for(&line.cpt), line.units.value()) else {
            continue;
        };
        if units > Decimal::from(limit) {
            changes.push(Change::UpdateLine {
                line_id: line.id,
                field: LineField::Units,
                from: units.to_string(),
                to: limit.to_string(),
                reason: FindingCode::MueExceeded.to_string(),
            });
        }
    }
}

fn propose_ncci_deletions(
    claim: &Claim,
    reference: &ReferenceData,
    flags: &AutofixFlags,
    changes: &mut Vec<Change>,
) {
    if !flags.is_enabled(FindingCode::NcciPair) {
        return;
    }
    for edit in &reference.ncci {
        if !claim.has_procedure_code(edit.primary()) {
            continue;
        }
        // Only the first line carrying the secondary code is removed.
        if let Some(secondary) = claim.first_line_with_code(edit.secondary()) {
            changes.push(Change::DeleteLine {
                line_id: secondary.id,
                reason: format!(
                    "{} {} vs {} ({})",
                    FindingCode::NcciPair,
                    edit.primary(),
                    edit.secondary(),
                    edit.edit_type()
                ),
            });
        }
    }
}

fn propose_payer_name(
    claim: &Claim,
    coverages: &dyn CoverageLookup,
    flags: &AutofixFlags,
    changes: &mut Vec<Change>,
) {
    if !flags.is_enabled(FindingCode::RequiredPayerName) || claim.has_payer_name() {
        return;
    }
    match coverages.latest_for_patient(claim.patient_id) {
        Some(coverage) if !coverage.payer_name.trim().is_empty() => {
            changes.push(Change::UpdateClaim {
                field: ClaimField::PayerName,
                from: claim.payer_name.clone(),
                to: coverage.payer_name,
                reason: FindingCode::RequiredPayerName.to_string(),
            });
        }
        _ => debug!(patient_id = %claim.patient_id, "No coverage with a payer name"),
    }
}

fn propose_total_charge(claim: &Claim, flags: &AutofixFlags, changes: &mut Vec<Change>) {
    if !flags.is_enabled(FindingCode::TotalChargeZero) {
        return;
    }
    let current = claim.total_charge.value_or_zero();
    let computed = claim.computed_line_total();
    if current <= Decimal::ZERO && computed > Decimal::ZERO {
        changes.push(Change::UpdateClaim {
            field: ClaimField::TotalCharge,
            from: current.to_string(),
            to: computed.to_string(),
            reason: FindingCode::TotalChargeZero.to_string(),
        });
    }
}

/// Applies approved changes and re-scrubs the claim
///
/// Header updates always commit. Line updates and deletions are re-resolved
/// against the claim's current lines and skipped when the line is gone.
///
/// # Arguments
///
/// * `claim` - The claim to mutate
/// * `changes` - Approved changes, applied in order
/// * `reference` - Tables for the confirming scrub
///
/// # Returns
///
/// The committed subset of `changes`, in their original order
#[instrument(skip_all, fields(claim_id = %claim.id, requested = changes.len()))]
pub fn apply_changes(claim: &mut Claim, changes: &[Change], reference: &ReferenceData) -> Vec<Change> {
    let mut committed = Vec::with_capacity(changes.len());

    for change in changes {
        if apply_one(claim, change) {
            info!(reason = change.reason(), "Committed change");
            committed.push(change.clone());
        } else {
            warn!(line_id = ?change.line_id(), reason = change.reason(), "Skipped change for missing line");
        }
    }

    scrub(claim, reference);
    committed
}

fn apply_one(claim: &mut Claim, change: &Change) -> bool {
    match change {
        Change::UpdateClaim { field, to, .. } => {
            match field {
                ClaimField::Pos => claim.pos = to.clone(),
                ClaimField::PayerName => claim.payer_name = to.clone(),
                ClaimField::TotalCharge => claim.total_charge = LenientDecimal::new(to.clone()),
            }
            true
        }
        Change::UpdateLine { line_id, field, to, .. } => match claim.line_mut(*line_id) {
            Some(line) => {
                match field {
                    LineField::Units => line.units = LenientDecimal::new(to.clone()),
                }
                true
            }
            None => false,
        },
        Change::DeleteLine { line_id, .. } => claim.remove_line(*line_id).is_some(),
    }
}
