//! Billing code normalization
//!
//! Procedure codes, modifiers and place-of-service codes are compared as
//! trimmed, upper-cased strings.

use crate::error::CoreError;

/// Place-of-service code for a physician office
pub const OFFICE_POS: &str = "11";

/// Trims and upper-cases a billing code
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Normalizes a code that must not be blank
///
/// # Errors
///
/// Returns `CoreError::Validation` naming `field` when the code is blank.
pub fn require_code(field: &str, code: &str) -> Result<String, CoreError> {
    let normalized = normalize_code(code);
    if normalized.is_empty() {
        return Err(CoreError::validation(format!("{} must not be blank", field)));
    }
    Ok(normalized)
}
