//! Reference data consulted by the scrubber
//!
//! MUE limits and NCCI code pairs are refreshed outside the engine and handed
//! in as plain values. Both are validated when they are built or
//! deserialized, so a table that reaches the scrubber is always well formed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use core_kernel::{normalize_code, require_code, CoverageId, PatientId};
use crate::error::ClaimError;

/// Medically unlikely edits: procedure code to maximum units
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HashMap<String, u32>", into = "HashMap<String, u32>")]
pub struct MueTable {
    limits: HashMap<String, u32>,
}

impl MueTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the unit limit for a procedure code
    ///
    /// # Errors
    ///
    /// Returns `ClaimError::InvalidArgument` if the code is blank.
    pub fn insert(&mut self, code: &str, max_units: u32) -> Result<(), ClaimError> {
        let code = require_code("MUE procedure code", code)?;
        self.limits.insert(code, max_units);
        Ok(())
    }

    /// Unit limit for a procedure code, if one is defined
    pub fn limit_for(&self, code: &str) -> Option<u32> {
        self.limits.get(&normalize_code(code)).copied()
    }

    pub fn len(&self) -> usize {
        self.limits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }
}

impl TryFrom<HashMap<String, u32>> for MueTable {
    type Error = ClaimError;

    fn try_from(raw: HashMap<String, u32>) -> Result<Self, Self::Error> {
        let mut table = MueTable::new();
        for (code, limit) in raw {
            table.insert(&code, limit)?;
        }
        Ok(table)
    }
}

impl From<MueTable> for HashMap<String, u32> {
    fn from(table: MueTable) -> Self {
        table.limits
    }
}

/// A pair of codes that must not be billed together
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawNcciEdit")]
pub struct NcciEdit {
    primary: String,
    secondary: String,
    edit_type: String,
}

#[derive(Deserialize)]
struct RawNcciEdit {
    primary: String,
    secondary: String,
    #[serde(default)]
    edit_type: String,
}

impl NcciEdit {
    /// Creates an edit between two distinct codes
    ///
    /// # Errors
    ///
    /// Returns `ClaimError::InvalidArgument` if either code is blank or
    /// both codes are the same.
    pub fn new(primary: &str, secondary: &str, edit_type: impl Into<String>) -> Result<Self, ClaimError> {
        let primary = require_code("NCCI primary code", primary)?;
        let secondary = require_code("NCCI secondary code", secondary)?;
        if primary == secondary {
            return Err(ClaimError::InvalidArgument(format!(
                "NCCI edit pairs {} with itself",
                primary
            )));
        }
        Ok(Self {
            primary,
            secondary,
            edit_type: edit_type.into(),
        })
    }

    /// Code that is kept when the pair is resolved
    pub fn primary(&self) -> &str {
        &self.primary
    }

    /// Code that is removed when the pair is resolved
    pub fn secondary(&self) -> &str {
        &self.secondary
    }

    pub fn edit_type(&self) -> &str {
        &self.edit_type
    }
}

impl TryFrom<RawNcciEdit> for NcciEdit {
    type Error = ClaimError;

    fn try_from(raw: RawNcciEdit) -> Result<Self, Self::Error> {
        NcciEdit::new(&raw.primary, &raw.secondary, raw.edit_type)
    }
}

/// Reference tables supplied to the scrubber
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceData {
    #[serde(default)]
    pub mue: MueTable,
    #[serde(default)]
    pub ncci: Vec<NcciEdit>,
}

impl ReferenceData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses reference tables from JSON
    ///
    /// # Errors
    ///
    /// Returns `ClaimError::InvalidReferenceData` if the document is malformed
    /// or contains a blank code.
    pub fn from_json(json_str: &str) -> Result<Self, ClaimError> {
        serde_json::from_str(json_str).map_err(|e| ClaimError::InvalidReferenceData(e.to_string()))
    }

    /// Adds an MUE limit
    pub fn with_mue(mut self, code: &str, max_units: u32) -> Result<Self, ClaimError> {
        self.mue.insert(code, max_units)?;
        Ok(self)
    }

    /// Adds an NCCI edit
    pub fn with_ncci(mut self, primary: &str, secondary: &str, edit_type: &str) -> Result<Self, ClaimError> {
        self.ncci.push(NcciEdit::new(primary, secondary, edit_type)?);
        Ok(self)
    }
}

/// An insurance coverage held by a patient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    pub id: CoverageId,
    pub patient_id: PatientId,
    pub payer_name: String,
    #[serde(default)]
    pub member_id: String,
    #[serde(default)]
    pub group_number: String,
    pub effective_date: Option<NaiveDate>,
    #[serde(default)]
    pub termination_date: Option<NaiveDate>,
}

/// Source of patient coverage records
pub trait CoverageLookup {
    /// Most recent coverage for a patient
    ///
    /// Coverages are ranked by effective date (latest first, undated last),
    /// then by id (highest first).
    fn latest_for_patient(&self, patient_id: PatientId) -> Option<Coverage>;
}

/// In-memory coverage store
#[derive(Debug, Clone, Default)]
pub struct CoverageRegistry {
    coverages: Vec<Coverage>,
}

impl CoverageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, coverage: Coverage) {
        self.coverages.push(coverage);
    }

    pub fn with_coverage(mut self, coverage: Coverage) -> Self {
        self.register(coverage);
        self
    }
}

impl CoverageLookup for CoverageRegistry {
    fn latest_for_patient(&self, patient_id: PatientId) -> Option<Coverage> {
        self.coverages
            .iter()
            .filter(|c| c.patient_id == patient_id)
            .max_by_key(|c| (c.effective_date.is_some(), c.effective_date, c.id))
            .cloned()
    }
}
