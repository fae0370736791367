//! Claim aggregate

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use core_kernel::{normalize_code, require_code, ClaimId, ClaimLineId, LenientDecimal, PatientId, OFFICE_POS};
use crate::error::ClaimError;
use crate::finding::Finding;

/// Maximum number of modifiers carried by a service line
pub const MAX_MODIFIERS: usize = 4;

/// Office/outpatient E/M procedure codes
pub const OFFICE_EM_RANGE: RangeInclusive<u32> = 99202..=99215;

/// A diagnosis listed on the claim header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnosis {
    /// ICD-10 code
    pub code: String,
    /// 1-based position referenced by line diagnosis pointers
    pub order: u32,
}

/// A service line on a claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimLine {
    /// Unique identifier
    pub id: ClaimLineId,
    /// CPT/HCPCS procedure code
    pub cpt: String,
    /// Modifier codes, at most four
    #[serde(default)]
    pub modifiers: Vec<String>,
    /// Units billed
    pub units: LenientDecimal,
    /// Charge per unit
    pub charge: LenientDecimal,
    /// 1-based pointers into the claim diagnoses
    #[serde(default)]
    pub dx_ptrs: Vec<u32>,
    /// Line-level place of service, when it differs from the header
    #[serde(default)]
    pub pos: Option<String>,
}

impl ClaimLine {
    /// Creates a line with no modifiers or diagnosis pointers
    pub fn new(
        cpt: impl Into<String>,
        units: impl Into<LenientDecimal>,
        charge: impl Into<LenientDecimal>,
    ) -> Self {
        Self {
            id: ClaimLineId::new_v7(),
            cpt: cpt.into(),
            modifiers: Vec::new(),
            units: units.into(),
            charge: charge.into(),
            dx_ptrs: Vec::new(),
            pos: None,
        }
    }

    /// Appends a modifier
    ///
    /// # Errors
    ///
    /// Returns `ClaimError::InvalidArgument` if the modifier is not a
    /// two-character code or the line already carries four modifiers.
    pub fn add_modifier(&mut self, modifier: &str) -> Result<(), ClaimError> {
        let modifier = require_code("modifier", modifier)?;
        if modifier.chars().count() != 2 {
            return Err(ClaimError::InvalidArgument(format!(
                "modifier {} must be two characters",
                modifier
            )));
        }
        if self.modifiers.len() >= MAX_MODIFIERS {
            return Err(ClaimError::InvalidArgument(format!(
                "line {} already has {} modifiers",
                self.id, MAX_MODIFIERS
            )));
        }
        self.modifiers.push(modifier);
        Ok(())
    }

    /// Builder form of [`ClaimLine::add_modifier`]
    pub fn with_modifier(mut self, modifier: &str) -> Result<Self, ClaimError> {
        self.add_modifier(modifier)?;
        Ok(self)
    }

    /// Sets the diagnosis pointers
    pub fn with_dx_ptrs(mut self, ptrs: impl IntoIterator<Item = u32>) -> Self {
        self.dx_ptrs = ptrs.into_iter().collect();
        self
    }

    /// Sets a line-level place of service
    pub fn with_pos(mut self, pos: impl Into<String>) -> Self {
        self.pos = Some(pos.into());
        self
    }

    /// True if the procedure code is numeric and inside the office E/M range
    pub fn is_office_em(&self) -> bool {
        self.cpt
            .trim()
            .parse::<u32>()
            .map(|n| OFFICE_EM_RANGE.contains(&n))
            .unwrap_or(false)
    }

    /// True if the line bills `code`
    pub fn has_code(&self, code: &str) -> bool {
        normalize_code(&self.cpt) == normalize_code(code)
    }

    /// True if the line carries `modifier`
    pub fn has_modifier(&self, modifier: &str) -> bool {
        let wanted = normalize_code(modifier);
        self.modifiers.iter().any(|m| normalize_code(m) == wanted)
    }

    /// Units multiplied by charge, malformed values counting as zero
    ///
    /// Saturates at the decimal bounds instead of overflowing.
    pub fn extended_charge(&self) -> Decimal {
        self.units.value_or_zero().saturating_mul(self.charge.value_or_zero())
    }
}

/// A professional claim with its service lines and diagnoses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Unique identifier
    pub id: ClaimId,
    /// Patient the services were rendered to
    pub patient_id: PatientId,
    /// Payer the claim is billed to
    #[serde(default)]
    pub payer_name: String,
    /// Two-character place-of-service code
    #[serde(default)]
    pub pos: String,
    /// Total charge as entered
    #[serde(default)]
    pub total_charge: LenientDecimal,
    /// Free-form workflow status (DRAFT, READY, ...)
    #[serde(default = "default_status")]
    pub status: String,
    /// Date of service, used for payer rule effective dates
    #[serde(default)]
    pub service_date: Option<NaiveDate>,
    /// Service lines, in billing order
    #[serde(default)]
    pub lines: Vec<ClaimLine>,
    /// Header diagnoses
    #[serde(default)]
    pub diagnoses: Vec<Diagnosis>,
    /// Findings from the most recent scrub
    #[serde(default)]
    pub findings: Vec<Finding>,
}

fn default_status() -> String {
    Claim::DRAFT.to_string()
}

impl Claim {
    /// Status given to newly created claims
    pub const DRAFT: &'static str = "DRAFT";

    /// Creates a draft claim with no lines
    pub fn new(
        patient_id: PatientId,
        payer_name: impl Into<String>,
        pos: impl Into<String>,
        total_charge: impl Into<LenientDecimal>,
    ) -> Self {
        Self {
            id: ClaimId::new_v7(),
            patient_id,
            payer_name: payer_name.into(),
            pos: pos.into(),
            total_charge: total_charge.into(),
            status: default_status(),
            service_date: None,
            lines: Vec::new(),
            diagnoses: Vec::new(),
            findings: Vec::new(),
        }
    }

    /// Appends a line and returns its id
    pub fn add_line(&mut self, line: ClaimLine) -> ClaimLineId {
        let id = line.id;
        self.lines.push(line);
        id
    }

    /// Builder form of [`Claim::add_line`]
    pub fn with_line(mut self, line: ClaimLine) -> Self {
        self.add_line(line);
        self
    }

    /// Appends a diagnosis and returns its 1-based order
    pub fn add_diagnosis(&mut self, code: impl Into<String>) -> u32 {
        let order = self.diagnoses.iter().map(|d| d.order).max().unwrap_or(0) + 1;
        self.diagnoses.push(Diagnosis {
            code: code.into(),
            order,
        });
        order
    }

    /// Looks up a line by id
    pub fn line(&self, id: ClaimLineId) -> Option<&ClaimLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    /// Looks up a line by id for mutation
    pub fn line_mut(&mut self, id: ClaimLineId) -> Option<&mut ClaimLine> {
        self.lines.iter_mut().find(|l| l.id == id)
    }

    /// Removes a line, returning it if it belonged to this claim
    pub fn remove_line(&mut self, id: ClaimLineId) -> Option<ClaimLine> {
        let idx = self.lines.iter().position(|l| l.id == id)?;
        Some(self.lines.remove(idx))
    }

    /// True if any line bills `code`
    pub fn has_procedure_code(&self, code: &str) -> bool {
        self.lines.iter().any(|l| l.has_code(code))
    }

    /// First line, in billing order, that bills `code`
    pub fn first_line_with_code(&self, code: &str) -> Option<&ClaimLine> {
        self.lines.iter().find(|l| l.has_code(code))
    }

    /// Diagnosis codes sorted by their order
    pub fn diagnosis_codes(&self) -> Vec<&str> {
        let mut sorted: Vec<&Diagnosis> = self.diagnoses.iter().collect();
        sorted.sort_by_key(|d| d.order);
        sorted.into_iter().map(|d| d.code.as_str()).collect()
    }

    /// Resolves a 1-based diagnosis pointer; out-of-range pointers yield `None`
    pub fn diagnosis_for_pointer(&self, ptr: u32) -> Option<&Diagnosis> {
        self.diagnoses.iter().find(|d| d.order == ptr)
    }

    /// Sum of units times charge over all lines
    pub fn computed_line_total(&self) -> Decimal {
        self.lines
            .iter()
            .map(ClaimLine::extended_charge)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// True if the claim is billed with the office place of service
    pub fn is_office_pos(&self) -> bool {
        self.pos.trim() == OFFICE_POS
    }

    /// True if a non-blank payer name is present
    pub fn has_payer_name(&self) -> bool {
        !self.payer_name.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(cpt: &str) -> ClaimLine {
        ClaimLine::new(cpt, "1", "10.00")
    }

    #[test]
    fn test_office_em_classification() {
        assert!(line("99202").is_office_em());
        assert!(line("99215").is_office_em());
        assert!(!line("99201").is_office_em());
        assert!(!line("99216").is_office_em());
        assert!(!line("G0439").is_office_em());
        assert!(!line("").is_office_em());
    }

    #[test]
    fn test_modifier_limit() {
        let mut l = line("99213");
        for m in ["25", "59", "LT", "RT"] {
            l.add_modifier(m).unwrap();
        }
        assert!(matches!(l.add_modifier("XU"), Err(ClaimError::InvalidArgument(_))));
        assert_eq!(l.modifiers.len(), MAX_MODIFIERS);
    }

    #[test]
    fn test_modifier_must_be_two_characters() {
        let mut l = line("99213");
        assert!(l.add_modifier("255").is_err());
        assert!(l.add_modifier(" ").is_err());
        assert!(l.modifiers.is_empty());
    }

    #[test]
    fn test_remove_line_only_removes_own_lines() {
        let mut claim = Claim::new(PatientId::new(), "Acme", "11", "10.00");
        let id = claim.add_line(line("99213"));

        assert!(claim.remove_line(ClaimLineId::new()).is_none());
        assert_eq!(claim.lines.len(), 1);
        assert!(claim.remove_line(id).is_some());
        assert!(claim.lines.is_empty());
    }

    #[test]
    fn test_diagnosis_order_is_sequential() {
        let mut claim = Claim::new(PatientId::new(), "Acme", "11", "10.00");
        assert_eq!(claim.add_diagnosis("I10"), 1);
        assert_eq!(claim.add_diagnosis("E11.9"), 2);
        assert_eq!(claim.diagnosis_codes(), vec!["I10", "E11.9"]);
        assert!(claim.diagnosis_for_pointer(3).is_none());
    }

    #[test]
    fn test_computed_line_total_ignores_malformed_values() {
        let claim = Claim::new(PatientId::new(), "Acme", "11", "0")
            .with_line(ClaimLine::new("99213", "2", "62.50"))
            .with_line(ClaimLine::new("36415", "x", "12.00"));

        assert_eq!(claim.computed_line_total(), dec!(125.00));
    }

    #[test]
    fn test_line_totals_saturate_instead_of_overflowing() {
        let huge_units = ClaimLine::new("99213", "79228162514264337593543950335", "2");
        assert_eq!(huge_units.extended_charge(), Decimal::MAX);

        let claim = Claim::new(PatientId::new(), "Acme", "11", "0")
            .with_line(ClaimLine::new("99213", "1", Decimal::MAX))
            .with_line(ClaimLine::new("36415", "1", "1"));
        assert_eq!(claim.computed_line_total(), Decimal::MAX);
    }
}
