//! Scrub findings

use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::ClaimLineId;

/// Rule that produced a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FindingCode {
    /// Claim has no payer name
    RequiredPayerName,
    /// Office E/M billed outside the office place of service
    PosConflict,
    /// Total charge is zero, negative or unparseable
    TotalChargeZero,
    /// Units exceed the medically unlikely edit
    MueExceeded,
    /// Two mutually exclusive codes billed together
    NcciPair,
}

impl FindingCode {
    /// All codes in evaluation order
    pub const ALL: [FindingCode; 5] = [
        FindingCode::RequiredPayerName,
        FindingCode::PosConflict,
        FindingCode::TotalChargeZero,
        FindingCode::MueExceeded,
        FindingCode::NcciPair,
    ];

    /// Wire name of the code
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingCode::RequiredPayerName => "REQUIRED_PAYER_NAME",
            FindingCode::PosConflict => "POS_CONFLICT",
            FindingCode::TotalChargeZero => "TOTAL_CHARGE_ZERO",
            FindingCode::MueExceeded => "MUE_EXCEEDED",
            FindingCode::NcciPair => "NCCI_PAIR",
        }
    }
}

impl fmt::Display for FindingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finding severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Blocks submission
    Error,
    /// Worth reviewing, does not block
    Warn,
}

/// A validation result attached to a claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub code: FindingCode,
    pub severity: Severity,
    pub message: String,
    /// Offending line, for line-level rules
    pub line_id: Option<ClaimLineId>,
    #[serde(default)]
    pub suggestion: String,
}

impl Finding {
    /// Creates a claim-level error
    pub fn error(code: FindingCode, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: Severity::Error,
            message: message.into(),
            line_id: None,
            suggestion: String::new(),
        }
    }

    /// Creates a claim-level warning
    pub fn warn(code: FindingCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warn,
            ..Self::error(code, message)
        }
    }

    /// Pins the finding to a line
    pub fn on_line(mut self, line_id: ClaimLineId) -> Self {
        self.line_id = Some(line_id);
        self
    }

    /// Attaches a suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = suggestion.into();
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Counts of findings by severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrubSummary {
    pub errors: usize,
    pub warnings: usize,
}

impl ScrubSummary {
    /// Tallies a finding list
    pub fn from_findings(findings: &[Finding]) -> Self {
        findings.iter().fold(Self::default(), |mut acc, f| {
            match f.severity {
                Severity::Error => acc.errors += 1,
                Severity::Warn => acc.warnings += 1,
            }
            acc
        })
    }

    /// True when nothing blocks submission
    pub fn is_clean(&self) -> bool {
        self.errors == 0
    }

    pub fn total(&self) -> usize {
        self.errors + self.warnings
    }
}
