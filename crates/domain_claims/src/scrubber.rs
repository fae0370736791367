//! Finding engine
//!
//! Runs the billing-compliance battery over a claim. Rules are evaluated in a
//! fixed order, which fixes the order of the resulting findings:
//!
//! ```text
//! REQUIRED_PAYER_NAME -> POS_CONFLICT -> TOTAL_CHARGE_ZERO -> MUE_EXCEEDED -> NCCI_PAIR
//! ```
//!
//! Malformed numbers never abort a pass. A total charge that does not parse
//! is reported as `TOTAL_CHARGE_ZERO`; units that do not parse are skipped by
//! the MUE check.

use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::claim::Claim;
use crate::finding::{Finding, FindingCode};
use crate::reference::ReferenceData;

/// Scrubs a claim, replacing its findings
///
/// Previously attached findings are discarded, so scrubbing an unchanged
/// claim twice yields the same findings in the same order.
///
/// # Arguments
///
/// * `claim` - The claim to scrub; its `findings` are overwritten
/// * `reference` - MUE and NCCI tables
///
/// # Returns
///
/// A copy of the findings now attached to the claim
#[instrument(skip_all, fields(claim_id = %claim.id, lines = claim.lines.len()))]
pub fn scrub(claim: &mut Claim, reference: &ReferenceData) -> Vec<Finding> {
    let findings = evaluate(claim, reference);
    debug!(count = findings.len(), "Scrub complete");
    claim.findings = findings.clone();
    findings
}

/// Evaluates every rule without touching the claim
pub fn evaluate(claim: &Claim, reference: &ReferenceData) -> Vec<Finding> {
    let mut findings = Vec::new();

    check_payer_name(claim, &mut findings);
    check_pos_conflict(claim, &mut findings);
    check_total_charge(claim, &mut findings);
    check_mue(claim, reference, &mut findings);
    check_ncci(claim, reference, &mut findings);

    findings
}

fn check_payer_name(claim: &Claim, findings: &mut Vec<Finding>) {
    if !claim.has_payer_name() {
        findings.push(Finding::error(
            FindingCode::RequiredPayerName,
            "Payer name is required on claim.",
        ));
    }
}

fn check_pos_conflict(claim: &Claim, findings: &mut Vec<Finding>) {
    if claim.is_office_pos() {
        return;
    }
    for line in claim.lines.iter().filter(|l| l.is_office_em()) {
        findings.push(
            Finding::error(
                FindingCode::PosConflict,
                format!("Office E/M {} cannot be used with POS {}.", line.cpt, claim.pos),
            )
            .on_line(line.id)
            .with_suggestion("Use appropriate E/M code or correct POS."),
        );
    }
}

fn check_total_charge(claim: &Claim, findings: &mut Vec<Finding>) {
    if !claim.total_charge.is_positive() {
        findings.push(
            Finding::warn(FindingCode::TotalChargeZero, "Total charge is zero or invalid.")
                .with_suggestion("Set a positive total_charge."),
        );
    }
}

fn check_mue(claim: &Claim, reference: &ReferenceData, findings: &mut Vec<Finding>) {
    for line in &claim.lines {
        let Some(limit) = reference.mue.limit_for(&line.cpt) else {
            continue;
        };
        let Some(units) = line.units.value() else {
            continue;
        };
        if units > Decimal::from(limit) {
            findings.push(
                Finding::error(
                    FindingCode::MueExceeded,
                    format!("Units {} for {} exceed limit {}.", units, line.cpt, limit),
                )
                .on_line(line.id)
                .with_suggestion(format!("Reduce to <= {} or split per policy.", limit)),
            );
        }
    }
}

fn check_ncci(claim: &Claim, reference: &ReferenceData, findings: &mut Vec<Finding>) {
    for edit in &reference.ncci {
        if claim.has_procedure_code(edit.primary()) && claim.has_procedure_code(edit.secondary()) {
            findings.push(
                Finding::error(
                    FindingCode::NcciPair,
                    format!(
                        "{} conflicts with {} ({}).",
                        edit.primary(),
                        edit.secondary(),
                        edit.edit_type()
                    ),
                )
                .with_suggestion("Remove one code or apply appropriate modifier per policy."),
            );
        }
    }
}
