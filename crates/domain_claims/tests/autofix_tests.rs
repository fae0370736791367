//! Remediation engine tests
//!
//! # Test Organization
//!
//! - `proposals` - What each finding code proposes
//! - `apply` - Committing approved changes
//! - `cycle` - Scrub, propose, apply, re-scrub

use chrono::NaiveDate;
use domain_claims::{
    apply_changes, propose_changes, scrub, AutofixFlags, Change, ClaimField, CoverageRegistry,
    FindingCode, LineField, ReferenceData,
};
use core_kernel::ClaimLineId;
use rust_decimal::Decimal;
use test_utils::{
    assert_deletes_line, assert_finding_codes, assert_no_finding, assert_no_finding_on_line,
    CodeFixtures, CoverageFixtures, ReferenceFixtures, TestClaimBuilder, TestLineBuilder,
};

fn no_coverage() -> CoverageRegistry {
    CoverageRegistry::new()
}

// ============================================================================
// Proposals
// ============================================================================

mod proposals {
    use super::*;

    #[test]
    fn test_pos_conflict_proposes_office_pos() {
        let mut claim = TestClaimBuilder::new()
            .with_pos(CodeFixtures::OUTPATIENT_POS)
            .with_code(CodeFixtures::OFFICE_VISIT, "125.00")
            .with_code(CodeFixtures::OFFICE_VISIT_L4, "150.00")
            .with_total("275.00")
            .build();

        let changes = propose_changes(&mut claim, &ReferenceData::new(), &no_coverage(), &AutofixFlags::default());

        assert_eq!(
            changes,
            vec![Change::UpdateClaim {
                field: ClaimField::Pos,
                from: "22".to_string(),
                to: "11".to_string(),
                reason: "POS_CONFLICT".to_string(),
            }]
        );
        assert_eq!(claim.findings.len(), 2);
    }

    #[test]
    fn test_mue_proposes_unit_cap() {
        let mut claim = TestClaimBuilder::new()
            .with_line(TestLineBuilder::new().units("5").build())
            .build();
        let line_id = claim.lines[0].id;

        let changes = propose_changes(&mut claim, &ReferenceFixtures::office_visit_mue(), &no_coverage(), &AutofixFlags::default());

        assert_eq!(
            changes,
            vec![Change::UpdateLine {
                line_id,
                field: LineField::Units,
                from: "5".to_string(),
                to: "2".to_string(),
                reason: "MUE_EXCEEDED".to_string(),
            }]
        );
    }

    #[test]
    fn test_ncci_deletes_first_secondary_line_only() {
        let mut claim = TestClaimBuilder::new()
            .with_code(CodeFixtures::OFFICE_VISIT, "100.00")
            .with_code(CodeFixtures::VENIPUNCTURE, "12.50")
            .with_code(CodeFixtures::VENIPUNCTURE, "12.50")
            .build();
        let first_secondary = claim.lines[1].id;

        let changes = propose_changes(&mut claim, &ReferenceFixtures::visit_venipuncture_ncci(), &no_coverage(), &AutofixFlags::default());

        assert_eq!(changes.len(), 1);
        assert_deletes_line(&changes, first_secondary);
        assert_eq!(changes[0].reason(), "NCCI_PAIR 99213 vs 36415 (mutually exclusive)");
    }

    #[test]
    fn test_missing_payer_filled_from_latest_coverage() {
        let patient = core_kernel::PatientId::new_v7();
        let coverages = CoverageRegistry::new()
            .with_coverage(CoverageFixtures::coverage(patient, "Old Payer", NaiveDate::from_ymd_opt(2021, 3, 1).unwrap()))
            .with_coverage(CoverageFixtures::coverage(patient, "BCBS IL", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        let mut claim = TestClaimBuilder::new().with_patient(patient).with_payer("").build();

        let changes = propose_changes(&mut claim, &ReferenceData::new(), &coverages, &AutofixFlags::default());

        assert_eq!(
            changes,
            vec![Change::UpdateClaim {
                field: ClaimField::PayerName,
                from: String::new(),
                to: "BCBS IL".to_string(),
                reason: "REQUIRED_PAYER_NAME".to_string(),
            }]
        );
    }

    #[test]
    fn test_missing_payer_without_coverage_proposes_nothing() {
        let mut claim = TestClaimBuilder::new().with_payer("").build();

        let changes = propose_changes(&mut claim, &ReferenceData::new(), &no_coverage(), &AutofixFlags::default());

        assert!(changes.is_empty());
        assert_finding_codes(&claim.findings, &[FindingCode::RequiredPayerName]);
    }

    #[test]
    fn test_coverage_with_blank_payer_proposes_nothing() {
        let patient = core_kernel::PatientId::new_v7();
        let coverages = CoverageFixtures::registry_for(patient, "  ");
        let mut claim = TestClaimBuilder::new().with_patient(patient).with_payer("").build();

        assert!(propose_changes(&mut claim, &ReferenceData::new(), &coverages, &AutofixFlags::default()).is_empty());
    }

    #[test]
    fn test_proposal_order() {
        let patient = core_kernel::PatientId::new_v7();
        let mut claim = TestClaimBuilder::new()
            .with_patient(patient)
            .with_payer("")
            .with_pos(CodeFixtures::INPATIENT_POS)
            .with_total("0")
            .with_line(TestLineBuilder::new().units("3").charge("50.00").build())
            .with_code(CodeFixtures::VENIPUNCTURE, "10.00")
            .build();

        let changes = propose_changes(
            &mut claim,
            &ReferenceFixtures::full(),
            &CoverageFixtures::registry_for(patient, "Acme Health"),
            &AutofixFlags::default(),
        );

        let reasons: Vec<&str> = changes.iter().map(Change::reason).collect();
        assert_eq!(
            reasons,
            vec![
                "POS_CONFLICT",
                "MUE_EXCEEDED",
                "NCCI_PAIR 99213 vs 36415 (mutually exclusive)",
                "REQUIRED_PAYER_NAME",
                "TOTAL_CHARGE_ZERO",
            ]
        );
        // Total reflects lines as they stand, before any fix is applied.
        assert!(matches!(&changes[4], Change::UpdateClaim { to, .. } if to == "160.00"));
    }

    #[test]
    fn test_total_proposal_saturates_on_huge_amounts() {
        let mut claim = TestClaimBuilder::new()
            .with_total("0")
            .with_line(
                TestLineBuilder::new()
                    .units("79228162514264337593543950335")
                    .charge("2")
                    .build(),
            )
            .build();

        let changes = propose_changes(&mut claim, &ReferenceData::new(), &no_coverage(), &AutofixFlags::default());

        assert_eq!(
            changes,
            vec![Change::UpdateClaim {
                field: ClaimField::TotalCharge,
                from: "0".to_string(),
                to: Decimal::MAX.to_string(),
                reason: "TOTAL_CHARGE_ZERO".to_string(),
            }]
        );
    }

    #[test]
    fn test_all_flags_off_proposes_nothing() {
        let mut claim = TestClaimBuilder::new()
            .with_payer("")
            .with_pos(CodeFixtures::INPATIENT_POS)
            .with_total("0")
            .with_line(TestLineBuilder::new().units("3").build())
            .build();

        let changes = propose_changes(&mut claim, &ReferenceFixtures::full(), &no_coverage(), &AutofixFlags::none());

        assert!(changes.is_empty());
        assert!(!claim.findings.is_empty());
    }
}

// ============================================================================
// Apply
// ============================================================================

mod apply {
    use super::*;

    #[test]
    fn test_change_for_foreign_line_is_skipped() {
        let mut claim = TestClaimBuilder::new()
            .with_line(TestLineBuilder::new().units("5").build())
            .build();
        let before = claim.lines.clone();
        let foreign = Change::UpdateLine {
            line_id: ClaimLineId::new_v7(),
            field: LineField::Units,
            from: "5".to_string(),
            to: "1".to_string(),
            reason: "MUE_EXCEEDED".to_string(),
        };
        let delete_foreign = Change::DeleteLine {
            line_id: ClaimLineId::new_v7(),
            reason: "NCCI_PAIR".to_string(),
        };

        let committed = apply_changes(&mut claim, &[foreign, delete_foreign], &ReferenceData::new());

        assert!(committed.is_empty());
        assert_eq!(claim.lines, before);
    }

    #[test]
    fn test_committed_subset_keeps_order() {
        let mut claim = TestClaimBuilder::new()
            .with_pos(CodeFixtures::OUTPATIENT_POS)
            .with_line(TestLineBuilder::new().units("5").build())
            .build();
        let line_id = claim.lines[0].id;
        let changes = vec![
            Change::DeleteLine {
                line_id: ClaimLineId::new_v7(),
                reason: "stale".to_string(),
            },
            Change::UpdateLine {
                line_id,
                field: LineField::Units,
                from: "5".to_string(),
                to: "2".to_string(),
                reason: "MUE_EXCEEDED".to_string(),
            },
            Change::UpdateClaim {
                field: ClaimField::Pos,
                from: "22".to_string(),
                to: "11".to_string(),
                reason: "POS_CONFLICT".to_string(),
            },
        ];

        let committed = apply_changes(&mut claim, &changes, &ReferenceFixtures::office_visit_mue());

        assert_eq!(committed, changes[1..].to_vec());
        assert_eq!(claim.pos, "11");
        assert_eq!(claim.lines[0].units.raw(), "2");
        assert!(claim.findings.is_empty());
    }

    #[test]
    fn test_deleting_same_line_twice_commits_once() {
        let mut claim = TestClaimBuilder::new()
            .with_code(CodeFixtures::OFFICE_VISIT, "100.00")
            .with_code(CodeFixtures::VENIPUNCTURE, "25.00")
            .build();
        let delete = Change::DeleteLine {
            line_id: claim.lines[1].id,
            reason: "NCCI_PAIR".to_string(),
        };

        let committed = apply_changes(&mut claim, &[delete.clone(), delete.clone()], &ReferenceData::new());

        assert_eq!(committed, vec![delete]);
        assert_eq!(claim.lines.len(), 1);
    }

    #[test]
    fn test_total_charge_update_accepts_raw_text() {
        let mut claim = TestClaimBuilder::new().with_total("100.00").build();
        let change = Change::UpdateClaim {
            field: ClaimField::TotalCharge,
            from: "100.00".to_string(),
            to: "not-a-number".to_string(),
            reason: "manual".to_string(),
        };

        let committed = apply_changes(&mut claim, &[change], &ReferenceData::new());

        assert_eq!(committed.len(), 1);
        assert_finding_codes(&claim.findings, &[FindingCode::TotalChargeZero]);
    }
}

// ============================================================================
// Cycle
// ============================================================================

mod cycle {
    use super::*;

    #[test]
    fn test_mue_resolved_after_apply() {
        let reference = ReferenceFixtures::office_visit_mue();
        let mut claim = TestClaimBuilder::new()
            .with_line(TestLineBuilder::new().units("5").build())
            .build();
        let line_id = claim.lines[0].id;

        let changes = propose_changes(&mut claim, &reference, &no_coverage(), &AutofixFlags::default());
        let committed = apply_changes(&mut claim, &changes, &reference);

        assert_eq!(committed, changes);
        assert_no_finding_on_line(&claim.findings, FindingCode::MueExceeded, line_id);
        assert!(scrub(&mut claim, &reference).is_empty());
    }

    #[test]
    fn test_ncci_resolved_after_apply() {
        let reference = ReferenceFixtures::visit_venipuncture_ncci();
        let mut claim = TestClaimBuilder::new()
            .with_total("125.00")
            .with_code(CodeFixtures::OFFICE_VISIT, "100.00")
            .with_code(CodeFixtures::VENIPUNCTURE, "25.00")
            .build();
        let secondary = claim.lines[1].id;

        let changes = propose_changes(&mut claim, &reference, &no_coverage(), &AutofixFlags::default());
        apply_changes(&mut claim, &changes, &reference);

        assert!(claim.line(secondary).is_none());
        assert_eq!(claim.lines.len(), 1);
        assert_no_finding(&claim.findings, FindingCode::NcciPair);
        assert_eq!(claim.computed_line_total().to_string(), "100.00");
    }

    #[test]
    fn test_partial_approval() {
        let patient = core_kernel::PatientId::new_v7();
        let reference = ReferenceFixtures::full();
        let mut claim = TestClaimBuilder::new()
            .with_patient(patient)
            .with_payer("")
            .with_pos(CodeFixtures::OUTPATIENT_POS)
            .with_code(CodeFixtures::OFFICE_VISIT, "125.00")
            .build();

        let changes = propose_changes(&mut claim, &reference, &CoverageFixtures::registry_for(patient, "Acme Health"), &AutofixFlags::default());
        let approved: Vec<Change> = changes
            .into_iter()
            .filter(|c| c.reason() == "REQUIRED_PAYER_NAME")
            .collect();
        apply_changes(&mut claim, &approved, &reference);

        assert_eq!(claim.payer_name, "Acme Health");
        assert_finding_codes(&claim.findings, &[FindingCode::PosConflict]);
    }
}
