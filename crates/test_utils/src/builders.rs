//! Test Data Builders
//!
//! Builder patterns for constructing claims with sensible defaults. Tests
//! specify only the fields they care about.

use chrono::NaiveDate;
use core_kernel::{LenientDecimal, PatientId};
use domain_claims::{Claim, ClaimLine};

use crate::fixtures::CodeFixtures;

/// Builder for constructing test claims
pub struct TestClaimBuilder {
    patient_id: PatientId,
    payer_name: String,
    pos: String,
    total_charge: LenientDecimal,
    status: String,
    service_date: Option<NaiveDate>,
    lines: Vec<ClaimLine>,
    diagnoses: Vec<String>,
}

impl Default for TestClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClaimBuilder {
    /// Creates a builder for an office claim billed to "Acme Health"
    pub fn new() -> Self {
        Self {
            patient_id: PatientId::new_v7(),
            payer_name: "Acme Health".to_string(),
            pos: "11".to_string(),
            total_charge: LenientDecimal::new("125.00"),
            status: Claim::DRAFT.to_string(),
            service_date: None,
            lines: Vec::new(),
            diagnoses: Vec::new(),
        }
    }

    /// Sets the patient
    pub fn with_patient(mut self, patient_id: PatientId) -> Self {
        self.patient_id = patient_id;
        self
    }

    /// Sets the payer name
    pub fn with_payer(mut self, payer_name: impl Into<String>) -> Self {
        self.payer_name = payer_name.into();
        self
    }

    /// Sets the place of service
    pub fn with_pos(mut self, pos: impl Into<String>) -> Self {
        self.pos = pos.into();
        self
    }

    /// Sets the total charge, raw text allowed
    pub fn with_total(mut self, total: impl Into<LenientDecimal>) -> Self {
        self.total_charge = total.into();
        self
    }

    /// Sets the status
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Sets the date of service
    pub fn with_service_date(mut self, date: NaiveDate) -> Self {
        self.service_date = Some(date);
        self
    }

    /// Adds a line
    pub fn with_line(mut self, line: ClaimLine) -> Self {
        self.lines.push(line);
        self
    }

    /// Adds a single-unit line for `cpt`
    pub fn with_code(self, cpt: &str, charge: &str) -> Self {
        self.with_line(TestLineBuilder::new().cpt(cpt).charge(charge).build())
    }

    /// Adds a diagnosis
    pub fn with_diagnosis(mut self, code: impl Into<String>) -> Self {
        self.diagnoses.push(code.into());
        self
    }

    /// Builds the claim
    pub fn build(self) -> Claim {
        let mut claim = Claim::new(self.patient_id, self.payer_name, self.pos, self.total_charge);
        claim.status = self.status;
        claim.service_date = self.service_date;
        for dx in self.diagnoses {
            claim.add_diagnosis(dx);
        }
        for line in self.lines {
            claim.add_line(line);
        }
        claim
    }
}

/// Builder for constructing test claim lines
pub struct TestLineBuilder {
    cpt: String,
    units: LenientDecimal,
    charge: LenientDecimal,
    modifiers: Vec<String>,
    dx_ptrs: Vec<u32>,
    pos: Option<String>,
}

impl Default for TestLineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestLineBuilder {
    /// Creates a builder for one unit of an office visit at $125.00
    pub fn new() -> Self {
        Self {
            cpt: CodeFixtures::OFFICE_VISIT.to_string(),
            units: LenientDecimal::new("1"),
            charge: LenientDecimal::new("125.00"),
            modifiers: Vec::new(),
            dx_ptrs: Vec::new(),
            pos: None,
        }
    }

    /// Sets the procedure code
    pub fn cpt(mut self, cpt: impl Into<String>) -> Self {
        self.cpt = cpt.into();
        self
    }

    /// Sets the units, raw text allowed
    pub fn units(mut self, units: impl Into<LenientDecimal>) -> Self {
        self.units = units.into();
        self
    }

    /// Sets the per-unit charge, raw text allowed
    pub fn charge(mut self, charge: impl Into<LenientDecimal>) -> Self {
        self.charge = charge.into();
        self
    }

    /// Adds a modifier
    pub fn modifier(mut self, modifier: impl Into<String>) -> Self {
        self.modifiers.push(modifier.into());
        self
    }

    /// Sets the diagnosis pointers
    pub fn dx_ptrs(mut self, ptrs: &[u32]) -> Self {
        self.dx_ptrs = ptrs.to_vec();
        self
    }

    /// Sets a line-level place of service
    pub fn pos(mut self, pos: impl Into<String>) -> Self {
        self.pos = Some(pos.into());
        self
    }

    /// Builds the line
    ///
    /// # Panics
    ///
    /// Panics if a modifier is rejected by [`ClaimLine::add_modifier`].
    pub fn build(self) -> ClaimLine {
        let mut line = ClaimLine::new(self.cpt, self.units, self.charge).with_dx_ptrs(self.dx_ptrs);
        for modifier in &self.modifiers {
            line.add_modifier(modifier).expect("valid modifier");
        }
        line.pos = self.pos;
        line
    }
}
