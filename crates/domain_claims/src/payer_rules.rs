//! Payer rule evaluation
//!
//! Payer-specific billing rules configured as data rather than code. A rule
//! targets either the claim header (`CLAIM` scope, diagnosis constraints) or
//! each service line (`LINE` scope, POS/modifier/diagnosis-pointer
//! constraints), optionally narrowed to a payer, a procedure code, a patient
//! demographic and an effective window.
//!
//! # Example
//!
//! ```rust,ignore
//! let rules = RuleSet::from_json(r#"[{
//!     "name": "E/M needs modifier 25 with procedure",
//!     "cpt_code": "99213",
//!     "modifiers_required": ["25"],
//!     "severity": "BLOCK"
//! }]"#)?;
//!
//! let issues = rules.evaluate(&claim, &PatientContext::default());
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::normalize_code;
use crate::claim::{Claim, ClaimLine};
use crate::error::ClaimError;

/// How strongly a rule violation is reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleSeverity {
    Block,
    #[default]
    Warn,
}

/// What a rule is evaluated against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleScope {
    #[default]
    Line,
    Claim,
}

/// A configurable payer rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayerRule {
    pub active: bool,
    pub name: String,
    pub scope: RuleScope,
    /// Payer the rule applies to; blank applies to every payer
    pub payer: String,
    /// Procedure code targeted by a line rule; blank targets every line
    pub cpt_code: String,
    pub pos_allowed: Vec<String>,
    pub modifiers_required: Vec<String>,
    /// At least one of these diagnoses must be present
    pub dx_required_any: Vec<String>,
    /// Claim diagnoses are restricted to this set
    pub dx_allowed: Vec<String>,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub sex_allowed: Vec<String>,
    /// Overrides the default issue message when non-empty
    pub message: String,
    pub severity: RuleSeverity,
    pub effective_start: Option<NaiveDate>,
    pub effective_end: Option<NaiveDate>,
}

impl Default for PayerRule {
    fn default() -> Self {
        Self {
            active: true,
            name: String::new(),
            scope: RuleScope::Line,
            payer: String::new(),
            cpt_code: String::new(),
            pos_allowed: Vec::new(),
            modifiers_required: Vec::new(),
            dx_required_any: Vec::new(),
            dx_allowed: Vec::new(),
            min_age: None,
            max_age: None,
            sex_allowed: Vec::new(),
            message: String::new(),
            severity: RuleSeverity::Warn,
            effective_start: None,
            effective_end: None,
        }
    }
}

/// Patient demographics used to narrow rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientContext {
    pub age: Option<u32>,
    pub sex: Option<String>,
}

/// A rule violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleIssue {
    pub severity: RuleSeverity,
    pub scope: RuleScope,
    /// 1-based line number for line rules
    pub line: Option<usize>,
    pub rule: String,
    pub message: String,
}

/// An ordered collection of payer rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<PayerRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<PayerRule>) -> Self {
        Self { rules }
    }

    /// Parses a JSON array of rules
    ///
    /// # Errors
    ///
    /// Returns `ClaimError::RuleParse` if the document is not a valid rule list.
    pub fn from_json(json_str: &str) -> Result<Self, ClaimError> {
        serde_json::from_str(json_str).map_err(|e| ClaimError::RuleParse(e.to_string()))
    }

    pub fn rules(&self) -> &[PayerRule] {
        &self.rules
    }

    /// Evaluates every applicable rule against a claim
    pub fn evaluate(&self, claim: &Claim, patient: &PatientContext) -> Vec<RuleIssue> {
        let dx_codes = claim.diagnosis_codes();
        let mut issues = Vec::new();

        for rule in self.rules.iter().filter(|r| r.applies_to(claim, patient)) {
            match rule.scope {
                RuleScope::Claim => rule.check_claim(&dx_codes, &mut issues),
                RuleScope::Line => {
                    for (idx, line) in claim.lines.iter().enumerate() {
                        rule.check_line(claim, idx + 1, line, &mut issues);
                    }
                }
            }
        }

        debug!(claim_id = %claim.id, rules = self.rules.len(), issues = issues.len(), "Evaluated payer rules");
        issues
    }
}

impl PayerRule {
    /// Whether the rule is in play for this claim and patient
    ///
    /// Unknown demographics or a missing service date do not exclude a rule.
    fn applies_to(&self, claim: &Claim, patient: &PatientContext) -> bool {
        if !self.active {
            return false;
        }
        if !self.payer.trim().is_empty()
            && !self.payer.trim().eq_ignore_ascii_case(claim.payer_name.trim())
        {
            return false;
        }
        if let Some(date) = claim.service_date {
            if self.effective_start.is_some_and(|start| date < start)
                || self.effective_end.is_some_and(|end| date > end)
            {
                return false;
            }
        }
        if let Some(age) = patient.age {
            if self.min_age.is_some_and(|min| age < min) || self.max_age.is_some_and(|max| age > max) {
                return false;
            }
        }
        if let Some(sex) = &patient.sex {
            if !self.sex_allowed.is_empty() && !contains_code(&self.sex_allowed, sex) {
                return false;
            }
        }
        true
    }

    fn check_claim(&self, dx_codes: &[&str], issues: &mut Vec<RuleIssue>) {
        let present = dx_codes.iter().filter(|dx| !dx.trim().is_empty());

        if !self.dx_allowed.is_empty()
            && present.clone().any(|dx| !contains_code(&self.dx_allowed, dx))
        {
            issues.push(self.issue(None, "DX not allowed".to_string()));
        }
        if !self.dx_required_any.is_empty()
            && !present.clone().any(|dx| contains_code(&self.dx_required_any, dx))
        {
            issues.push(self.issue(None, "Required DX missing".to_string()));
        }
    }

    fn check_line(&self, claim: &Claim, line_no: usize, line: &ClaimLine, issues: &mut Vec<RuleIssue>) {
        if !self.cpt_code.trim().is_empty() && !line.has_code(&self.cpt_code) {
            return;
        }

        let pos = line.pos.as_deref().unwrap_or(&claim.pos);
        if !self.pos_allowed.is_empty() && !pos.trim().is_empty() && !contains_code(&self.pos_allowed, pos) {
            issues.push(self.issue(Some(line_no), format!("POS {} not allowed", pos)));
        }

        let missing: Vec<&str> = self
            .modifiers_required
            .iter()
            .filter(|m| !line.has_modifier(m))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            issues.push(self.issue(Some(line_no), format!("Missing modifier(s): {}", missing.join(", "))));
        }

        if !self.dx_required_any.is_empty() {
            let pointed = line
                .dx_ptrs
                .iter()
                .filter_map(|ptr| claim.diagnosis_for_pointer(*ptr))
                .any(|dx| contains_code(&self.dx_required_any, &dx.code));
            if !pointed {
                issues.push(self.issue(Some(line_no), "Required DX pointer missing".to_string()));
            }
        }
    }

    fn issue(&self, line: Option<usize>, default_message: String) -> RuleIssue {
        RuleIssue {
            severity: self.severity,
            scope: self.scope,
            line,
            rule: self.name.clone(),
            message: if self.message.is_empty() {
                default_message
            } else {
                self.message.clone()
            },
        }
    }
}

fn contains_code(codes: &[String], code: &str) -> bool {
    let wanted = normalize_code(code);
    codes.iter().any(|c| normalize_code(c) == wanted)
}
