//! Pre-built Test Fixtures
//!
//! Ready-to-use reference tables, coverages and claims. Codes and amounts
//! are stable so tests can assert on exact messages.

use chrono::NaiveDate;
use core_kernel::{CoverageId, PatientId};
use domain_claims::{Claim, ClaimLine, Coverage, CoverageRegistry, ReferenceData};

/// Procedure code fixtures
pub struct CodeFixtures;

impl CodeFixtures {
    /// Established patient office visit, level 3
    pub const OFFICE_VISIT: &'static str = "99213";
    /// Established patient office visit, level 4
    pub const OFFICE_VISIT_L4: &'static str = "99214";
    /// Routine venipuncture
    pub const VENIPUNCTURE: &'static str = "36415";
    /// Electrocardiogram
    pub const ECG: &'static str = "93000";
    /// Annual wellness visit (non-numeric HCPCS)
    pub const WELLNESS: &'static str = "G0439";
    /// Inpatient hospital place of service
    pub const INPATIENT_POS: &'static str = "21";
    /// Outpatient hospital place of service
    pub const OUTPATIENT_POS: &'static str = "22";
}

/// Reference data fixtures
pub struct ReferenceFixtures;

impl ReferenceFixtures {
    /// MUE of 2 units for the office visit
    pub fn office_visit_mue() -> ReferenceData {
        ReferenceData::new()
            .with_mue(CodeFixtures::OFFICE_VISIT, 2)
            .expect("valid MUE fixture")
    }

    /// Office visit and venipuncture are mutually exclusive
    pub fn visit_venipuncture_ncci() -> ReferenceData {
        ReferenceData::new()
            .with_ncci(CodeFixtures::OFFICE_VISIT, CodeFixtures::VENIPUNCTURE, "mutually exclusive")
            .expect("valid NCCI fixture")
    }

    /// Both tables together plus an ECG limit
    pub fn full() -> ReferenceData {
        ReferenceData::new()
            .with_mue(CodeFixtures::OFFICE_VISIT, 2)
            .and_then(|r| r.with_mue(CodeFixtures::ECG, 1))
            .and_then(|r| r.with_ncci(CodeFixtures::OFFICE_VISIT, CodeFixtures::VENIPUNCTURE, "mutually exclusive"))
            .expect("valid reference fixture")
    }
}

/// Coverage fixtures
pub struct CoverageFixtures;

impl CoverageFixtures {
    /// A dated coverage for a patient
    pub fn coverage(patient_id: PatientId, payer_name: &str, effective: NaiveDate) -> Coverage {
        Coverage {
            id: CoverageId::new_v7(),
            patient_id,
            payer_name: payer_name.to_string(),
            member_id: "MBR-0001".to_string(),
            group_number: "GRP-01".to_string(),
            effective_date: Some(effective),
            termination_date: None,
        }
    }

    /// Registry with one active coverage for the patient
    pub fn registry_for(patient_id: PatientId, payer_name: &str) -> CoverageRegistry {
        CoverageRegistry::new().with_coverage(Self::coverage(
            patient_id,
            payer_name,
            NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
        ))
    }
}

/// Canned claims
pub struct ClaimFixtures;

impl ClaimFixtures {
    /// Office claim with one level-3 visit, nothing to report
    pub fn clean_office_visit() -> Claim {
        Claim::new(PatientId::new_v7(), "Acme Health", "11", "125.00")
            .with_line(ClaimLine::new(CodeFixtures::OFFICE_VISIT, "1", "125.00"))
    }
}
