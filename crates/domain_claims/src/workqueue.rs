//! Billing work queue
//!
//! Collects the claims that still need attention, with their findings split
//! into blocking errors and warnings.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use core_kernel::{ClaimId, PatientId};
use crate::claim::Claim;
use crate::finding::{Finding, FindingCode, Severity};
use crate::reference::ReferenceData;
use crate::scrubber::scrub;

/// A finding reduced to what a biller needs on the queue screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    pub code: FindingCode,
    pub message: String,
}

impl From<&Finding> for QueueItem {
    fn from(finding: &Finding) -> Self {
        Self {
            code: finding.code,
            message: finding.message.clone(),
        }
    }
}

/// A claim with outstanding findings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkqueueEntry {
    pub claim_id: ClaimId,
    pub patient_id: PatientId,
    pub payer_name: String,
    pub pos: String,
    pub total_charge: String,
    pub status: String,
    pub errors: Vec<QueueItem>,
    pub warnings: Vec<QueueItem>,
}

/// Builds the work queue for a batch of claims
///
/// When `rescrub` is set every claim is scrubbed first; otherwise the
/// findings already attached to each claim are used. Claims without findings
/// are left out. Entries keep the input order.
#[instrument(skip_all, fields(claims = claims.len(), rescrub = rescrub))]
pub fn build_workqueue(claims: &mut [Claim], reference: &ReferenceData, rescrub: bool) -> Vec<WorkqueueEntry> {
    if rescrub {
        for claim in claims.iter_mut() {
            scrub(claim, reference);
        }
    }

    let entries: Vec<WorkqueueEntry> = claims.iter().filter_map(entry_for).collect();
    debug!(entries = entries.len(), "Built work queue");
    entries
}

fn entry_for(claim: &Claim) -> Option<WorkqueueEntry> {
    let by_severity = |severity: Severity| -> Vec<QueueItem> {
        claim
            .findings
            .iter()
            .filter(|f| f.severity == severity)
            .map(QueueItem::from)
            .collect()
    };

    let errors = by_severity(Severity::Error);
    let warnings = by_severity(Severity::Warn);
    if errors.is_empty() && warnings.is_empty() {
        return None;
    }

    Some(WorkqueueEntry {
        claim_id: claim.id,
        patient_id: claim.patient_id,
        payer_name: claim.payer_name.clone(),
        pos: claim.pos.clone(),
        total_charge: claim.total_charge.raw().to_string(),
        status: claim.status.clone(),
        errors,
        warnings,
    })
}
