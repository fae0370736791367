//! Engine configuration

use serde::Deserialize;

use crate::autofix::AutofixFlags;
use crate::error::ClaimError;

/// Environment variable prefix, e.g. `SCRUB_AUTOFIX__NCCI_PAIR=false`
pub const ENV_PREFIX: &str = "SCRUB";

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Which auto-fixes may be proposed
    pub autofix: AutofixFlags,
}

impl EngineConfig {
    /// Loads configuration from the process environment
    pub fn from_env() -> Result<Self, ClaimError> {
        Self::from_environment(config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Loads configuration from a JSON document
    pub fn from_json(json_str: &str) -> Result<Self, ClaimError> {
        config::Config::builder()
            .add_source(config::File::from_str(json_str, config::FileFormat::Json))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ClaimError::Configuration(e.to_string()))
    }

    fn from_environment(env: config::Environment) -> Result<Self, ClaimError> {
        config::Config::builder()
            .add_source(env.prefix_separator("_").separator("__").try_parsing(true))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ClaimError::Configuration(e.to_string()))
    }
}
