// crates/rfid-compliance-core/src/core/value.rs
// ============================================================================
// Module: Parameter Values
// Description: Concrete values assigned to reader parameters.
// Purpose: Represent enum, integer, float, and range values uniformly.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`ParamValue`] is untagged on the wire so profiles read naturally in TOML
//! and JSON: `q_value = 1`, `tari = 6.25`, `session = "S1"`,
//! `frequency_band = { low = 902.75, high = 927.25 }`. Integers decode before
//! floats, so whole numbers always arrive as [`ParamValue::Integer`]; float
//! fields accept them through [`ParamValue::as_f64`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Value Types
// ============================================================================

/// Closed numeric interval carried as a single parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    /// Inclusive lower bound.
    pub low: f64,
    /// Inclusive upper bound.
    pub high: f64,
}

impl ValueRange {
    /// Creates a range value.
    #[must_use]
    pub const fn new(low: f64, high: f64) -> Self {
        Self {
            low,
            high,
        }
    }
}

/// Concrete value of a reader parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Whole number (mode identifiers, Q, filter counts).
    Integer(i64),
    /// Real number (Tari, transmit power).
    Float(f64),
    /// Symbolic value (session, region, spectral mask).
    Text(String),
    /// Closed interval (frequency band).
    Range(ValueRange),
}

impl ParamValue {
    /// Creates a text value.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Returns the value as an integer when it is one.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value as a real number when it is numeric.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        reason = "Parameter integers are far below 2^52; widening is exact in practice."
    )]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value as text when it is symbolic.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value as a range when it is one.
    #[must_use]
    pub const fn as_range(&self) -> Option<ValueRange> {
        match self {
            Self::Range(range) => Some(*range),
            _ => None,
        }
    }

    /// Returns false when any numeric part of the value is NaN or infinite.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        match self {
            Self::Integer(_) | Self::Text(_) => true,
            Self::Float(value) => value.is_finite(),
            Self::Range(range) => range.low.is_finite() && range.high.is_finite(),
        }
    }

    /// Returns a short label for the value's shape.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Range(_) => "range",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
            Self::Range(range) => write!(f, "[{}, {}]", range.low, range.high),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<ValueRange> for ParamValue {
    fn from(value: ValueRange) -> Self {
        Self::Range(value)
    }
}
