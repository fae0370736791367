//! Custom Test Assertions
//!
//! Assertion helpers for findings and changes that print the full finding
//! list on failure.

use core_kernel::ClaimLineId;
use domain_claims::{Change, Finding, FindingCode};

/// Asserts the finding codes, in order
pub fn assert_finding_codes(findings: &[Finding], expected: &[FindingCode]) {
    let actual: Vec<FindingCode> = findings.iter().map(|f| f.code).collect();
    assert_eq!(actual, expected, "Unexpected findings: {:#?}", findings);
}

/// Asserts that no finding with `code` is present
pub fn assert_no_finding(findings: &[Finding], code: FindingCode) {
    assert!(
        findings.iter().all(|f| f.code != code),
        "Expected no {} finding, got {:#?}",
        code,
        findings
    );
}

/// Asserts that no finding with `code` references `line_id`
pub fn assert_no_finding_on_line(findings: &[Finding], code: FindingCode, line_id: ClaimLineId) {
    assert!(
        !findings.iter().any(|f| f.code == code && f.line_id == Some(line_id)),
        "Expected no {} finding on line {}, got {:#?}",
        code,
        line_id,
        findings
    );
}

/// Asserts that a change set contains a deletion of `line_id`
pub fn assert_deletes_line(changes: &[Change], line_id: ClaimLineId) {
    assert!(
        changes
            .iter()
            .any(|c| matches!(c, Change::DeleteLine { line_id: id, .. } if *id == line_id)),
        "Expected deletion of line {}, got {:#?}",
        line_id,
        changes
    );
}
