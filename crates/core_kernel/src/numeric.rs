//! Lenient decimal values
//!
//! Claim amounts and unit counts arrive from intake forms and imports as
//! loosely-typed text. A [`LenientDecimal`] keeps the raw text as received and
//! only interprets it when a rule asks for a number, so a malformed value
//! never aborts a scrub: it simply reads as "absent".

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Parses a decimal from free-form text.
///
/// Surrounding whitespace is ignored and scientific notation is accepted.
/// Returns `None` for anything that is not a finite decimal.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .ok()
        .or_else(|| Decimal::from_scientific(trimmed).ok())
}

/// A decimal field that preserves its raw input
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LenientDecimal(String);

impl LenientDecimal {
    /// Wraps raw text without validating it
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the text exactly as it was supplied
    pub fn raw(&self) -> &str {
        &self.0
    }

    /// Interprets the raw text, `None` when it is not a number
    pub fn value(&self) -> Option<Decimal> {
        parse_decimal(&self.0)
    }

    /// Interprets the raw text, folding malformed input to zero
    pub fn value_or_zero(&self) -> Decimal {
        self.value().unwrap_or(Decimal::ZERO)
    }

    /// True when the value parses and is strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.value().map(|v| v > Decimal::ZERO).unwrap_or(false)
    }
}

impl fmt::Display for LenientDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Decimal> for LenientDecimal {
    fn from(value: Decimal) -> Self {
        Self(value.to_string())
    }
}

impl From<u32> for LenientDecimal {
    fn from(value: u32) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for LenientDecimal {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for LenientDecimal {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl Serialize for LenientDecimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for LenientDecimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Imports send amounts both as JSON strings and as bare numbers.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Integer(i64),
            Float(f64),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text(s) => Self(s),
            Repr::Integer(i) => Self(i.to_string()),
            Repr::Float(f) => Self(f.to_string()),
        })
    }
}
