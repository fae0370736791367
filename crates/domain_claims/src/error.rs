//! Claims domain errors

use thiserror::Error;

use core_kernel::CoreError;

/// Errors raised at the engine boundary
///
/// Data-quality problems inside a claim never surface here; they become
/// findings. These variants signal that the caller broke the call contract.
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid reference data: {0}")]
    InvalidReferenceData(String),

    #[error("Failed to parse payer rules: {0}")]
    RuleParse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<CoreError> for ClaimError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => ClaimError::InvalidArgument(msg),
        }
    }
}
