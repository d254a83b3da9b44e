// crates/rfid-compliance-core/src/core/check.rs
// ============================================================================
// Module: Declarative Checks
// Description: Leaf predicates over profile values and reference tables.
// Purpose: Supply the domain leaves composed by the rule algebra.
// Dependencies: crate::core::{identifiers, profile, tables, value}, rfid-rules, serde
// ============================================================================

//! ## Overview
//! A [`Check`] is a serializable, side-effect-free predicate. It reads profile
//! values by field name and, for table-driven checks, looks up the RF mode or
//! region those values select. A check whose inputs are missing, mistyped, or
//! refer to an unknown table row does not hold.
//!
//! Checks serialize internally tagged by `kind`:
//!
//! ```toml
//! kind = "compare"
//! field = "q_value"
//! comparator = "less_than_or_equal"
//! value = 2
//! ```

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;

use rfid_rules::CheckEval;
use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::FieldName;
use crate::core::profile::Profile;
use crate::core::tables::ReferenceTables;
use crate::core::tables::RegionLimits;
use crate::core::tables::RfMode;
use crate::core::value::ParamValue;

// ============================================================================
// SECTION: Comparators
// ============================================================================

/// Binary comparison between two values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    /// `left == right`.
    Equals,
    /// `left != right`.
    NotEquals,
    /// `left < right`.
    LessThan,
    /// `left <= right`.
    LessThanOrEqual,
    /// `left > right`.
    GreaterThan,
    /// `left >= right`.
    GreaterThanOrEqual,
}

impl Comparator {
    /// Applies the comparator.
    ///
    /// Numbers compare numerically across integer and float. Text and range
    /// values support equality only; ordering comparators on them fail, as
    /// does any comparison involving NaN.
    #[must_use]
    pub fn holds(self, left: &ParamValue, right: &ParamValue) -> bool {
        if let (Some(left), Some(right)) = (left.as_i64(), right.as_i64()) {
            return self.accepts(left.cmp(&right));
        }
        if let (Some(left), Some(right)) = (left.as_f64(), right.as_f64()) {
            return left.partial_cmp(&right).is_some_and(|ordering| self.accepts(ordering));
        }
        match self {
            Self::Equals => left == right,
            Self::NotEquals => left != right,
            Self::LessThan
            | Self::LessThanOrEqual
            | Self::GreaterThan
            | Self::GreaterThanOrEqual => false,
        }
    }

    /// Returns true when `ordering` satisfies the comparator.
    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Self::Equals => ordering == Ordering::Equal,
            Self::NotEquals => ordering != Ordering::Equal,
            Self::LessThan => ordering == Ordering::Less,
            Self::LessThanOrEqual => ordering != Ordering::Greater,
            Self::GreaterThan => ordering == Ordering::Greater,
            Self::GreaterThanOrEqual => ordering != Ordering::Less,
        }
    }
}

// ============================================================================
// SECTION: Mode Attributes
// ============================================================================

/// Attribute of an RF mode table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeAttribute {
    /// Backscatter data rate (bps).
    Bdr,
    /// Miller modulation depth M.
    ModulationDepth,
    /// PIE ratio in thousandths.
    Pie,
    /// Shortest supported Tari (µs).
    MinTari,
    /// Longest supported Tari (µs).
    MaxTari,
    /// Spectral mask symbol.
    SpectralMask,
    /// Forward-link modulation symbol.
    ForwardLinkModulation,
}

impl ModeAttribute {
    /// Reads the attribute from a mode row as a parameter value.
    #[must_use]
    pub fn value_of(self, mode: &RfMode) -> ParamValue {
        match self {
            Self::Bdr => ParamValue::Integer(i64::from(mode.bdr)),
            Self::ModulationDepth => ParamValue::Integer(i64::from(mode.modulation_depth)),
            Self::Pie => ParamValue::Integer(i64::from(mode.pie)),
            Self::MinTari => ParamValue::Float(mode.min_tari_us),
            Self::MaxTari => ParamValue::Float(mode.max_tari_us),
            Self::SpectralMask => ParamValue::text(mode.spectral_mask.symbol()),
            Self::ForwardLinkModulation => ParamValue::text(mode.forward_link_modulation.symbol()),
        }
    }
}

// ============================================================================
// SECTION: Checks
// ============================================================================

/// Leaf predicate of a constraint rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Check {
    /// Compares a field with a constant.
    Compare {
        /// Field read from the profile.
        field: FieldName,
        /// Comparison applied as `field <op> value`.
        comparator: Comparator,
        /// Constant right-hand side.
        value: ParamValue,
    },
    /// Requires a field to equal one of the listed values.
    OneOf {
        /// Field read from the profile.
        field: FieldName,
        /// Permitted values.
        values: Vec<ParamValue>,
    },
    /// Compares an attribute of the selected RF mode with a constant.
    ModeAttribute {
        /// Field holding the RF mode identifier.
        mode_field: FieldName,
        /// Mode attribute to read.
        attribute: ModeAttribute,
        /// Comparison applied as `attribute <op> value`.
        comparator: Comparator,
        /// Constant right-hand side.
        value: ParamValue,
    },
    /// Requires a field to equal an attribute of the selected RF mode.
    MatchesMode {
        /// Field read from the profile.
        field: FieldName,
        /// Field holding the RF mode identifier.
        mode_field: FieldName,
        /// Mode attribute the field must equal.
        attribute: ModeAttribute,
    },
    /// Requires Tari to lie inside the selected RF mode's Tari window.
    TariWithinMode {
        /// Field holding Tari in µs.
        tari_field: FieldName,
        /// Field holding the RF mode identifier.
        mode_field: FieldName,
    },
    /// Requires transmit power at or below the selected region's ceiling.
    PowerWithinRegion {
        /// Field holding transmit power in dBm.
        power_field: FieldName,
        /// Field holding the region symbol.
        region_field: FieldName,
    },
    /// Requires the frequency band to lie inside the selected region's band.
    BandWithinRegion {
        /// Field holding the band as a range in MHz.
        band_field: FieldName,
        /// Field holding the region symbol.
        region_field: FieldName,
    },
    /// Requires the 2^Q slot count to suit the expected tag population.
    ///
    /// Holds when `2^Q * factor >= population` and
    /// `2^Q <= population * factor`.
    SlotsFitPopulation {
        /// Field holding Q.
        q_field: FieldName,
        /// Field holding the expected tag population.
        population_field: FieldName,
        /// Tolerance factor in both directions.
        factor: u32,
    },
}

impl Check {
    /// Returns the fields this check reads, in declaration order.
    #[must_use]
    pub fn scope(&self) -> Vec<&FieldName> {
        match self {
            Self::Compare {
                field, ..
            }
            | Self::OneOf {
                field, ..
            } => vec![field],
            Self::ModeAttribute {
                mode_field, ..
            } => vec![mode_field],
            Self::MatchesMode {
                field,
                mode_field,
                ..
            } => vec![field, mode_field],
            Self::TariWithinMode {
                tari_field,
                mode_field,
            } => vec![tari_field, mode_field],
            Self::PowerWithinRegion {
                power_field,
                region_field,
            } => vec![power_field, region_field],
            Self::BandWithinRegion {
                band_field,
                region_field,
            } => vec![band_field, region_field],
            Self::SlotsFitPopulation {
                q_field,
                population_field,
                ..
            } => vec![q_field, population_field],
        }
    }

    /// Evaluates the check; missing inputs make it fail.
    fn holds(&self, context: &CheckContext<'_>) -> Option<bool> {
        match self {
            Self::Compare {
                field,
                comparator,
                value,
            } => Some(comparator.holds(context.value(field)?, value)),
            Self::OneOf {
                field,
                values,
            } => {
                let actual = context.value(field)?;
                Some(values.iter().any(|value| Comparator::Equals.holds(actual, value)))
            }
            Self::ModeAttribute {
                mode_field,
                attribute,
                comparator,
                value,
            } => {
                let mode = context.mode(mode_field)?;
                Some(comparator.holds(&attribute.value_of(mode), value))
            }
            Self::MatchesMode {
                field,
                mode_field,
                attribute,
            } => {
                let actual = context.value(field)?;
                let mode = context.mode(mode_field)?;
                Some(Comparator::Equals.holds(actual, &attribute.value_of(mode)))
            }
            Self::TariWithinMode {
                tari_field,
                mode_field,
            } => {
                let tari = context.value(tari_field)?.as_f64()?;
                let mode = context.mode(mode_field)?;
                Some(tari >= mode.min_tari_us && tari <= mode.max_tari_us)
            }
            Self::PowerWithinRegion {
                power_field,
                region_field,
            } => {
                let power = context.value(power_field)?.as_f64()?;
                let limits = context.region(region_field)?;
                Some(power <= limits.max_power_dbm)
            }
            Self::BandWithinRegion {
                band_field,
                region_field,
            } => {
                let band = context.value(band_field)?.as_range()?;
                let limits = context.region(region_field)?;
                Some(band.low >= limits.band_low_mhz && band.high <= limits.band_high_mhz)
            }
            Self::SlotsFitPopulation {
                q_field,
                population_field,
                factor,
            } => {
                let q = u32::try_from(context.value(q_field)?.as_i64()?).ok()?;
                let population = u64::try_from(context.value(population_field)?.as_i64()?).ok()?;
                let slots = 1u64.checked_shl(q)?;
                let factor = u64::from(*factor);
                Some(
                    slots.saturating_mul(factor) >= population
                        && slots <= population.saturating_mul(factor),
                )
            }
        }
    }
}

// ============================================================================
// SECTION: Evaluation Context
// ============================================================================

/// Read-only view a [`Check`] is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct CheckContext<'a> {
    /// Profile under evaluation.
    pub profile: &'a Profile,
    /// Reference tables owned by the constraint set.
    pub tables: &'a ReferenceTables,
}

impl<'a> CheckContext<'a> {
    /// Returns a profile value.
    fn value(&self, field: &FieldName) -> Option<&'a ParamValue> {
        self.profile.get(field.as_str())
    }

    /// Returns the RF mode selected by a field.
    fn mode(&self, mode_field: &FieldName) -> Option<&'a RfMode> {
        let identifier = u32::try_from(self.value(mode_field)?.as_i64()?).ok()?;
        self.tables.mode(identifier)
    }

    /// Returns the region selected by a field.
    fn region(&self, region_field: &FieldName) -> Option<&'a RegionLimits> {
        self.tables.region(self.value(region_field)?.as_text()?)
    }
}

impl CheckEval for Check {
    type Context<'a> = CheckContext<'a>;

    fn eval_check(&self, context: &Self::Context<'_>) -> bool {
        self.holds(context).unwrap_or(false)
    }
}
