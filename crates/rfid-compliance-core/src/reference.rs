// crates/rfid-compliance-core/src/reference.rs
// ============================================================================
// Module: Industrial Reference Table
// Description: Built-in RF parameter schema, constraints, and profiles.
// Purpose: Encode the low-interference industrial recommendations.
// Dependencies: crate::{core, runtime}, rfid-rules, serde, thiserror
// ============================================================================

//! ## Overview
//! The industrial reference table recommends a conservative air interface
//! for dense, low-interference deployments: a slow Miller-free RF mode
//! (BDR 64 kbps, M=1), short Tari, the dense-interrogator mask, session S1
//! with a small Q, and few select filters. This module turns those rows into
//! a sealed [`ParameterSchema`], an ordered [`ConstraintSet`], and the
//! `industrial-conservative` profile.
//!
//! [`ReaderSettings`] converts an admitted reference profile into the typed
//! integers a reader expects. It builds no protocol messages.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rfid_rules::Rule;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::Check;
use crate::core::Comparator;
use crate::core::Constraint;
use crate::core::ConstraintError;
use crate::core::ConstraintSet;
use crate::core::Domain;
use crate::core::Field;
use crate::core::FieldName;
use crate::core::ForwardLinkModulation;
use crate::core::ModeAttribute;
use crate::core::ParamValue;
use crate::core::ParameterSchema;
use crate::core::Profile;
use crate::core::ReferenceTables;
use crate::core::RegionLimits;
use crate::core::RfMode;
use crate::core::SchemaError;
use crate::core::SemanticType;
use crate::core::Severity;
use crate::core::SpectralMask;
use crate::core::ValueRange;
use crate::runtime::AcceptedProfile;

// ============================================================================
// SECTION: Names
// ============================================================================

/// Operating region symbol.
pub const REGION: &str = "region";
/// RF mode identifier.
pub const RF_MODE: &str = "rf_mode";
/// Miller modulation depth M.
pub const MODULATION_DEPTH: &str = "modulation_depth";
/// Spectral mask symbol.
pub const SPECTRAL_MASK: &str = "spectral_mask";
/// Tari in microseconds.
pub const TARI: &str = "tari";
/// Conducted transmit power in dBm.
pub const TRANSMIT_POWER: &str = "transmit_power";
/// Gen2 session symbol.
pub const SESSION: &str = "session";
/// Initial Q value.
pub const Q_VALUE: &str = "q_value";
/// Expected tag population.
pub const TAG_POPULATION: &str = "tag_population";
/// Number of select filters.
pub const SELECT_FILTERS: &str = "select_filters";
/// Frequency band in MHz.
pub const FREQUENCY_BAND: &str = "frequency_band";

/// Name of the built-in conservative profile.
pub const INDUSTRIAL_CONSERVATIVE: &str = "industrial-conservative";

/// Identifier of the conservative RF mode (BDR 64 kbps, M=1).
pub const CONSERVATIVE_RF_MODE: u32 = 1004;

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Tunable thresholds of the built-in constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceSettings {
    /// Highest acceptable backscatter data rate in bps.
    pub bdr_ceiling_bps: u32,
    /// Tari below which session S0 draws a warning, in µs.
    pub short_tari_us: f64,
    /// Highest Q recommended under session S1.
    pub max_q_for_session_s1: i64,
    /// Tolerance factor between 2^Q slots and the tag population.
    pub population_factor: u32,
    /// Highest permitted number of select filters.
    pub max_select_filters: i64,
}

impl Default for ReferenceSettings {
    fn default() -> Self {
        Self {
            bdr_ceiling_bps: 120_000,
            short_tari_us: 12.5,
            max_q_for_session_s1: 2,
            population_factor: 4,
            max_select_filters: 2,
        }
    }
}

// ============================================================================
// SECTION: Reference Tables
// ============================================================================

/// Returns the reader's RF mode table and the supported regions.
#[must_use]
pub fn reference_tables() -> ReferenceTables {
    ReferenceTables {
        rf_modes: vec![
            rf_mode(1000, 1, 640_000, 1500, (6.25, 6.25), SpectralMask::MultiInterrogator),
            rf_mode(1002, 4, 250_000, 2000, (20.0, 25.0), SpectralMask::DenseInterrogator),
            rf_mode(1003, 4, 300_000, 2000, (6.25, 25.0), SpectralMask::DenseInterrogator),
            rf_mode(1004, 1, 64_000, 2000, (6.25, 25.0), SpectralMask::DenseInterrogator),
            rf_mode(1005, 8, 160_000, 2000, (12.5, 25.0), SpectralMask::DenseInterrogator),
        ],
        regions: vec![
            region("FCC", 30.0, 902.0, 928.0),
            region("ETSI_LOWER", 33.0, 865.6, 867.6),
            region("ETSI_UPPER", 33.0, 915.0, 921.0),
            region("JP", 30.0, 916.8, 920.8),
            region("CN", 33.0, 920.5, 924.5),
        ],
    }
}

/// Builds one RF mode row.
const fn rf_mode(
    mode_identifier: u32,
    modulation_depth: u8,
    bdr: u32,
    pie: u32,
    tari_us: (f64, f64),
    spectral_mask: SpectralMask,
) -> RfMode {
    RfMode {
        mode_identifier,
        modulation_depth,
        bdr,
        pie,
        min_tari_us: tari_us.0,
        max_tari_us: tari_us.1,
        spectral_mask,
        forward_link_modulation: ForwardLinkModulation::PrAsk,
    }
}

/// Builds one region row.
fn region(name: &str, max_power_dbm: f64, band_low_mhz: f64, band_high_mhz: f64) -> RegionLimits {
    RegionLimits {
        region: name.to_string(),
        max_power_dbm,
        band_low_mhz,
        band_high_mhz,
    }
}

// ============================================================================
// SECTION: Schema
// ============================================================================

/// Defines the eleven reference fields on an unsealed schema.
///
/// The `rf_mode` and `region` domains are taken from `tables`.
///
/// # Errors
///
/// Returns [`SchemaError`] when a field collides with an existing one or the
/// tables leave the mode or region domain empty.
pub fn define_industrial_fields(
    schema: &mut ParameterSchema,
    tables: &ReferenceTables,
) -> Result<(), SchemaError> {
    let regions: Vec<String> = tables.regions.iter().map(|limits| limits.region.clone()).collect();
    let modes: Vec<i64> =
        tables.rf_modes.iter().map(|mode| i64::from(mode.mode_identifier)).collect();

    schema.define(
        Field::new(
            REGION,
            SemanticType::Enum,
            Domain::Choices {
                values: regions,
            },
        )
        .with_default("FCC"),
    )?;
    schema.define(
        Field::new(
            RF_MODE,
            SemanticType::Integer,
            Domain::IntegerSet {
                values: modes,
            },
        )
        .with_default(i64::from(CONSERVATIVE_RF_MODE)),
    )?;
    schema.define(
        Field::new(MODULATION_DEPTH, SemanticType::Integer, interval(1.0, 8.0)).with_default(1_i64),
    )?;
    schema.define(
        Field::new(SPECTRAL_MASK, SemanticType::Enum, choices(&["SI", "MI", "DI"]))
            .with_default("DI"),
    )?;
    schema.define(
        Field::new(TARI, SemanticType::Float, interval(6.25, 25.0))
            .with_unit("us")
            .with_default(6.25),
    )?;
    schema.define(
        Field::new(TRANSMIT_POWER, SemanticType::Float, interval(10.0, 33.0))
            .with_unit("dBm")
            .with_default(27.0),
    )?;
    schema.define(
        Field::new(SESSION, SemanticType::Enum, choices(&["S0", "S1", "S2", "S3"]))
            .with_default("S1"),
    )?;
    schema.define(
        Field::new(Q_VALUE, SemanticType::Integer, interval(0.0, 15.0)).with_default(1_i64),
    )?;
    schema.define(
        Field::new(TAG_POPULATION, SemanticType::Integer, interval(1.0, 10_000.0))
            .with_unit("tags")
            .with_default(4_i64),
    )?;
    schema.define(
        Field::new(SELECT_FILTERS, SemanticType::Integer, interval(0.0, 8.0)).with_default(1_i64),
    )?;
    schema.define(
        Field::new(FREQUENCY_BAND, SemanticType::Range, interval(840.0, 960.0))
            .with_unit("MHz")
            .with_default(ValueRange::new(902.75, 927.25)),
    )?;
    Ok(())
}

/// Returns the sealed reference schema over the built-in tables.
///
/// # Errors
///
/// Returns [`SchemaError`] only if the built-in definitions are malformed.
pub fn industrial_schema() -> Result<ParameterSchema, SchemaError> {
    let mut schema = ParameterSchema::new();
    define_industrial_fields(&mut schema, &reference_tables())?;
    schema.seal();
    Ok(schema)
}

/// Builds an interval domain.
const fn interval(min: f64, max: f64) -> Domain {
    Domain::Interval {
        min,
        max,
    }
}

/// Builds a choices domain.
fn choices(values: &[&str]) -> Domain {
    Domain::Choices {
        values: values.iter().map(ToString::to_string).collect(),
    }
}

// ============================================================================
// SECTION: Constraints
// ============================================================================

/// Appends the eleven reference constraints in their canonical order.
///
/// # Errors
///
/// Returns [`ConstraintError`] when the set's schema lacks a reference field
/// or a reference id is already taken.
pub fn add_industrial_constraints(
    set: &mut ConstraintSet,
    settings: &ReferenceSettings,
) -> Result<(), ConstraintError> {
    for constraint in industrial_constraint_list(settings) {
        set.add_constraint(constraint)?;
    }
    Ok(())
}

/// Returns a constraint set over the built-in tables with the reference rules.
///
/// # Errors
///
/// Returns [`ConstraintError`] when `schema` lacks a reference field.
pub fn industrial_constraints(
    schema: &ParameterSchema,
    settings: &ReferenceSettings,
) -> Result<ConstraintSet, ConstraintError> {
    let mut set = ConstraintSet::with_tables(schema, reference_tables())?;
    add_industrial_constraints(&mut set, settings)?;
    Ok(set)
}

/// Builds the reference constraints.
fn industrial_constraint_list(settings: &ReferenceSettings) -> Vec<Constraint> {
    vec![
        Constraint::new(
            "rf-mode-bdr-ceiling",
            Severity::HardFail,
            "RfModeBdrExceedsCeiling",
            format!(
                "industrial-conservative profiles require a backscatter data rate of at most {} bps",
                settings.bdr_ceiling_bps
            ),
            Rule::check(Check::ModeAttribute {
                mode_field: RF_MODE.into(),
                attribute: ModeAttribute::Bdr,
                comparator: Comparator::LessThanOrEqual,
                value: ParamValue::Integer(i64::from(settings.bdr_ceiling_bps)),
            }),
        ),
        Constraint::new(
            "modulation-depth-range",
            Severity::HardFail,
            "ModulationDepthMismatch",
            "modulation depth must be one of 1, 2, 3, 4, 8 and match the selected RF mode",
            Rule::all([
                Rule::check(Check::OneOf {
                    field: MODULATION_DEPTH.into(),
                    values: [1_i64, 2, 3, 4, 8].into_iter().map(ParamValue::Integer).collect(),
                }),
                Rule::check(Check::MatchesMode {
                    field: MODULATION_DEPTH.into(),
                    mode_field: RF_MODE.into(),
                    attribute: ModeAttribute::ModulationDepth,
                }),
            ]),
        ),
        Constraint::new(
            "tari-mode-bounds",
            Severity::HardFail,
            "TariOutsideModeBounds",
            "tari must lie within the selected RF mode's supported window",
            Rule::check(Check::TariWithinMode {
                tari_field: TARI.into(),
                mode_field: RF_MODE.into(),
            }),
        ),
        Constraint::new(
            "spectral-mask-mode-match",
            Severity::HardFail,
            "SpectralMaskMismatch",
            "spectral mask must match the selected RF mode",
            Rule::check(Check::MatchesMode {
                field: SPECTRAL_MASK.into(),
                mode_field: RF_MODE.into(),
                attribute: ModeAttribute::SpectralMask,
            }),
        ),
        Constraint::new(
            "session-tari-interaction",
            Severity::Warning,
            "ShortTariWithoutPersistence",
            format!(
                "session S0 with tari below {} us raises repeated-read noise in dense environments",
                settings.short_tari_us
            ),
            Rule::implies(
                compare(SESSION, Comparator::Equals, ParamValue::text("S0")),
                compare(
                    TARI,
                    Comparator::GreaterThanOrEqual,
                    ParamValue::Float(settings.short_tari_us),
                ),
            ),
        ),
        Constraint::new(
            "q-value-bounds",
            Severity::HardFail,
            "QValueOutOfRange",
            "q value must lie within [0, 15]",
            Rule::all([
                compare(Q_VALUE, Comparator::GreaterThanOrEqual, ParamValue::Integer(0)),
                compare(Q_VALUE, Comparator::LessThanOrEqual, ParamValue::Integer(15)),
            ]),
        ),
        Constraint::new(
            "q-value-session-preference",
            Severity::Warning,
            "QValueAboveSessionPreference",
            format!(
                "session S1 favors q at most {} to limit collision overhead",
                settings.max_q_for_session_s1
            ),
            Rule::implies(
                compare(SESSION, Comparator::Equals, ParamValue::text("S1")),
                compare(
                    Q_VALUE,
                    Comparator::LessThanOrEqual,
                    ParamValue::Integer(settings.max_q_for_session_s1),
                ),
            ),
        ),
        Constraint::new(
            "q-value-population",
            Severity::Warning,
            "QValueMismatchesPopulation",
            format!(
                "2^q slots should be within a factor of {} of the expected tag population",
                settings.population_factor
            ),
            Rule::check(Check::SlotsFitPopulation {
                q_field: Q_VALUE.into(),
                population_field: TAG_POPULATION.into(),
                factor: settings.population_factor,
            }),
        ),
        Constraint::new(
            "power-range-check",
            Severity::HardFail,
            "TransmitPowerAboveRegulatoryCeiling",
            "transmit power must not exceed the declared region's regulatory ceiling",
            Rule::check(Check::PowerWithinRegion {
                power_field: TRANSMIT_POWER.into(),
                region_field: REGION.into(),
            }),
        ),
        Constraint::new(
            "frequency-band-region",
            Severity::HardFail,
            "FrequencyBandOutsideRegion",
            "frequency band must lie within the declared region's band",
            Rule::check(Check::BandWithinRegion {
                band_field: FREQUENCY_BAND.into(),
                region_field: REGION.into(),
            }),
        ),
        Constraint::new(
            "select-filter-limit",
            Severity::HardFail,
            "SelectFilterLimitExceeded",
            format!("at most {} select filters may be active", settings.max_select_filters),
            compare(
                SELECT_FILTERS,
                Comparator::LessThanOrEqual,
                ParamValue::Integer(settings.max_select_filters),
            ),
        ),
    ]
}

/// Builds a single comparison rule.
fn compare(field: &str, comparator: Comparator, value: ParamValue) -> Rule<Check> {
    Rule::check(Check::Compare {
        field: field.into(),
        comparator,
        value,
    })
}

// ============================================================================
// SECTION: Profiles
// ============================================================================

/// Returns the `industrial-conservative` profile.
///
/// Mode 1004 (BDR 64000, M=1), Tari 6.25 µs, DI mask, session S1, Q=1,
/// FCC at 27 dBm across 902.75-927.25 MHz, one select filter.
#[must_use]
pub fn industrial_conservative_profile() -> Profile {
    Profile::from_values([
        (REGION, ParamValue::text("FCC")),
        (RF_MODE, ParamValue::Integer(i64::from(CONSERVATIVE_RF_MODE))),
        (MODULATION_DEPTH, ParamValue::Integer(1)),
        (SPECTRAL_MASK, ParamValue::text("DI")),
        (TARI, ParamValue::Float(6.25)),
        (TRANSMIT_POWER, ParamValue::Float(27.0)),
        (SESSION, ParamValue::text("S1")),
        (Q_VALUE, ParamValue::Integer(1)),
        (TAG_POPULATION, ParamValue::Integer(4)),
        (SELECT_FILTERS, ParamValue::Integer(1)),
        (FREQUENCY_BAND, ParamValue::Range(ValueRange::new(902.75, 927.25))),
    ])
}

// ============================================================================
// SECTION: Reader Settings
// ============================================================================

/// Errors raised while converting an admitted profile into reader settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// The profile lacks a reference field.
    #[error("admitted profile has no {0} field")]
    MissingField(FieldName),
    /// A value cannot be represented as the reader expects.
    #[error("cannot convert {field} = {value} into a reader setting")]
    Unconvertible {
        /// Field being converted.
        field: FieldName,
        /// Rendered value.
        value: String,
    },
}

/// Integer reader parameters derived from an admitted reference profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReaderSettings {
    /// Region symbol.
    pub region: String,
    /// RF mode identifier.
    pub mode_identifier: u32,
    /// Tari in nanoseconds.
    pub tari_ns: u32,
    /// Session number (0-3).
    pub session: u8,
    /// Initial Q.
    pub initial_q: u8,
    /// Transmit power in hundredths of a dBm.
    pub transmit_power_cdbm: i32,
    /// Number of select filters.
    pub select_filter_count: u16,
    /// Expected tag population.
    pub tag_population: u16,
    /// Lower band edge in kHz.
    pub band_low_khz: u32,
    /// Upper band edge in kHz.
    pub band_high_khz: u32,
}

impl ReaderSettings {
    /// Converts an admitted profile that uses the reference field names.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when a reference field is missing or its
    /// value does not fit the reader's integer representation.
    pub fn from_accepted(accepted: &AcceptedProfile) -> Result<Self, SettingsError> {
        let profile = accepted.profile();
        let band = value(profile, FREQUENCY_BAND)?;
        let range = band.as_range().ok_or_else(|| unconvertible(FREQUENCY_BAND, band))?;
        Ok(Self {
            region: text(profile, REGION)?.to_string(),
            mode_identifier: integer(profile, RF_MODE)?,
            tari_ns: scaled(profile, TARI, 1000.0)?,
            session: session_number(profile)?,
            initial_q: integer(profile, Q_VALUE)?,
            transmit_power_cdbm: scaled(profile, TRANSMIT_POWER, 100.0)?,
            select_filter_count: integer(profile, SELECT_FILTERS)?,
            tag_population: integer(profile, TAG_POPULATION)?,
            band_low_khz: scale_to(range.low, 1000.0)
                .ok_or_else(|| unconvertible(FREQUENCY_BAND, band))?,
            band_high_khz: scale_to(range.high, 1000.0)
                .ok_or_else(|| unconvertible(FREQUENCY_BAND, band))?,
        })
    }
}

/// Returns a profile value or a missing-field error.
fn value<'a>(profile: &'a Profile, field: &str) -> Result<&'a ParamValue, SettingsError> {
    profile.get(field).ok_or_else(|| SettingsError::MissingField(FieldName::new(field)))
}

/// Builds an unconvertible-value error.
fn unconvertible(field: &str, value: &ParamValue) -> SettingsError {
    SettingsError::Unconvertible {
        field: FieldName::new(field),
        value: value.to_string(),
    }
}

/// Reads a text value.
fn text<'a>(profile: &'a Profile, field: &str) -> Result<&'a str, SettingsError> {
    let found = value(profile, field)?;
    found.as_text().ok_or_else(|| unconvertible(field, found))
}

/// Reads an integer value narrowed to `T`.
fn integer<T: TryFrom<i64>>(profile: &Profile, field: &str) -> Result<T, SettingsError> {
    let found = value(profile, field)?;
    found
        .as_i64()
        .and_then(|number| T::try_from(number).ok())
        .ok_or_else(|| unconvertible(field, found))
}

/// Reads a real value, scales it, and rounds it into `T`.
fn scaled<T: TryFrom<i64>>(profile: &Profile, field: &str, scale: f64) -> Result<T, SettingsError> {
    let found = value(profile, field)?;
    found
        .as_f64()
        .and_then(|number| scale_to(number, scale))
        .ok_or_else(|| unconvertible(field, found))
}

/// Scales and rounds a real number into `T`.
#[allow(
    clippy::cast_possible_truncation,
    reason = "The rounded value is bounded by u32::MAX in magnitude before the cast."
)]
fn scale_to<T: TryFrom<i64>>(number: f64, scale: f64) -> Option<T> {
    let rounded = (number * scale).round();
    if !rounded.is_finite() || rounded.abs() > f64::from(u32::MAX) {
        return None;
    }
    T::try_from(rounded as i64).ok()
}

/// Reads the session symbol `S0`..`S3` as its number.
fn session_number(profile: &Profile) -> Result<u8, SettingsError> {
    let found = value(profile, SESSION)?;
    found
        .as_text()
        .and_then(|symbol| symbol.strip_prefix('S'))
        .and_then(|digits| digits.parse::<u8>().ok())
        .filter(|number| *number <= 3)
        .ok_or_else(|| unconvertible(SESSION, found))
}
