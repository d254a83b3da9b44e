// crates/rfid-compliance-config/src/config.rs
// ============================================================================
// Module: RFID Compliance Configuration
// Description: Configuration loading and validation for the compliance engine.
// Purpose: Provide strict, fail-closed parsing of rfid-compliance.toml.
// Dependencies: rfid-compliance-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The file extends the built-in industrial reference table with extra RF mode
//! and region rows, fields, constraints, and named profiles:
//!
//! ```toml
//! [engine]
//! audit = "file"
//! audit_path = "compliance-audit.jsonl"
//!
//! [reference]
//! bdr_ceiling_bps = 160000
//!
//! [[constraints]]
//! id = "warehouse-filter-limit"
//! severity = "warning"
//! code = "WarehouseFilterLimit"
//! rationale = "warehouse portals run with a single select filter"
//! rule = { check = { kind = "compare", field = "select_filters", comparator = "less_than_or_equal", value = 1 } }
//!
//! [[profiles]]
//! name = "warehouse-portal"
//! version = 1
//! values = { session = "S2", q_value = 2 }
//! ```
//!
//! Missing or invalid configuration fails closed; nothing is truncated or
//! ignored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use rfid_compliance_core::Constraint;
use rfid_compliance_core::ConstraintError;
use rfid_compliance_core::Field;
use rfid_compliance_core::Profile;
use rfid_compliance_core::ProfileName;
use rfid_compliance_core::ReferenceSettings;
use rfid_compliance_core::RegionLimits;
use rfid_compliance_core::RegistryError;
use rfid_compliance_core::RfMode;
use rfid_compliance_core::SchemaError;
use serde::Deserialize;
use thiserror::Error;

use crate::pack::CompliancePack;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "rfid-compliance.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "RFID_COMPLIANCE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of extra schema fields.
pub(crate) const MAX_FIELDS: usize = 256;
/// Maximum number of extra constraints.
pub(crate) const MAX_CONSTRAINTS: usize = 1024;
/// Maximum number of configured profiles.
pub(crate) const MAX_PROFILES: usize = 1024;
/// Maximum number of extra rows per reference table.
pub(crate) const MAX_TABLE_ROWS: usize = 256;
/// Maximum length of names, ids, codes, and region symbols.
pub(crate) const MAX_IDENTIFIER_LENGTH: usize = 128;
/// Maximum length of a constraint rationale.
pub(crate) const MAX_RATIONALE_LENGTH: usize = 1024;
/// Highest Q value defined by the air protocol.
const MAX_Q_VALUE: i64 = 15;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// RFID compliance configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComplianceConfig {
    /// Engine configuration.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Built-in reference table configuration.
    #[serde(default)]
    pub reference: ReferenceConfig,
    /// Extra RF mode rows.
    #[serde(default)]
    pub rf_modes: Vec<RfMode>,
    /// Extra region rows.
    #[serde(default)]
    pub regions: Vec<RegionLimits>,
    /// Extra schema fields, defined after the reference fields.
    #[serde(default)]
    pub fields: Vec<Field>,
    /// Extra constraints, evaluated after the reference constraints.
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    /// Named, versioned profiles.
    #[serde(default)]
    pub profiles: Vec<ProfileConfig>,
    /// Path the configuration was loaded from (not serialized).
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl ComplianceConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml(content)?;
        config.source = Some(resolved);
        Ok(config)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] when a limit is violated.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if content.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// Cross-references between fields, constraints, and tables are checked
    /// when the pack is built.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        self.reference.validate()?;
        validate_count("rf_modes", self.rf_modes.len(), MAX_TABLE_ROWS)?;
        validate_count("regions", self.regions.len(), MAX_TABLE_ROWS)?;
        validate_count("fields", self.fields.len(), MAX_FIELDS)?;
        validate_count("constraints", self.constraints.len(), MAX_CONSTRAINTS)?;
        validate_count("profiles", self.profiles.len(), MAX_PROFILES)?;
        for region in &self.regions {
            validate_identifier("regions.region", &region.region)?;
        }
        for field in &self.fields {
            validate_identifier("fields.name", field.name.as_str())?;
        }
        for constraint in &self.constraints {
            validate_constraint(constraint)?;
        }
        for profile in &self.profiles {
            profile.validate()?;
        }
        if !self.reference.enabled && self.fields.is_empty() {
            return Err(ConfigError::Invalid(
                "fields must be defined when the reference table is disabled".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the compliance pack described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when fields, constraints, tables, or profiles
    /// are inconsistent, or the audit sink cannot be opened.
    pub fn build(&self) -> Result<CompliancePack, ConfigError> {
        self.validate()?;
        CompliancePack::from_config(self)
    }
}

/// Audit destination for evaluation and setup events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditMode {
    /// Audit events are discarded.
    #[default]
    #[serde(rename = "none")]
    Disabled,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to `audit_path`.
    File,
}

/// Engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Audit destination.
    #[serde(default)]
    pub audit: AuditMode,
    /// Audit log path, required for [`AuditMode::File`].
    #[serde(default)]
    pub audit_path: Option<String>,
}

impl EngineConfig {
    /// Validates the audit settings.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.audit, self.audit_path.as_deref()) {
            (AuditMode::File, Some(path)) => validate_path_string("engine.audit_path", path),
            (AuditMode::File, None) => Err(ConfigError::Invalid(
                "engine.audit_path must be set when audit = \"file\"".to_string(),
            )),
            (_, Some(_)) => Err(ConfigError::Invalid(
                "engine.audit_path requires audit = \"file\"".to_string(),
            )),
            (_, None) => Ok(()),
        }
    }
}

/// Built-in reference table configuration.
///
/// Thresholds sit directly under `[reference]` next to `enabled`; unset
/// thresholds keep their [`ReferenceSettings`] defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "ReferenceSection")]
pub struct ReferenceConfig {
    /// Whether the reference fields, rows, constraints, and profile load.
    pub enabled: bool,
    /// Thresholds of the reference constraints.
    pub settings: ReferenceSettings,
}

/// Raw `[reference]` table as written in the file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReferenceSection {
    /// Whether the reference table loads.
    #[serde(default = "default_true")]
    enabled: bool,
    /// Override for [`ReferenceSettings::bdr_ceiling_bps`].
    bdr_ceiling_bps: Option<u32>,
    /// Override for [`ReferenceSettings::short_tari_us`].
    short_tari_us: Option<f64>,
    /// Override for [`ReferenceSettings::max_q_for_session_s1`].
    max_q_for_session_s1: Option<i64>,
    /// Override for [`ReferenceSettings::population_factor`].
    population_factor: Option<u32>,
    /// Override for [`ReferenceSettings::max_select_filters`].
    max_select_filters: Option<i64>,
}

impl From<ReferenceSection> for ReferenceConfig {
    fn from(section: ReferenceSection) -> Self {
        let defaults = ReferenceSettings::default();
        Self {
            enabled: section.enabled,
            settings: ReferenceSettings {
                bdr_ceiling_bps: section.bdr_ceiling_bps.unwrap_or(defaults.bdr_ceiling_bps),
                short_tari_us: section.short_tari_us.unwrap_or(defaults.short_tari_us),
                max_q_for_session_s1: section
                    .max_q_for_session_s1
                    .unwrap_or(defaults.max_q_for_session_s1),
                population_factor: section
                    .population_factor
                    .unwrap_or(defaults.population_factor),
                max_select_filters: section
                    .max_select_filters
                    .unwrap_or(defaults.max_select_filters),
            },
        }
    }
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            settings: ReferenceSettings::default(),
        }
    }
}

impl ReferenceConfig {
    /// Validates the reference thresholds.
    fn validate(&self) -> Result<(), ConfigError> {
        let settings = &self.settings;
        if settings.bdr_ceiling_bps == 0 {
            return Err(ConfigError::Invalid(
                "reference.bdr_ceiling_bps must be greater than zero".to_string(),
            ));
        }
        if !settings.short_tari_us.is_finite() || settings.short_tari_us <= 0.0 {
            return Err(ConfigError::Invalid(
                "reference.short_tari_us must be a positive number".to_string(),
            ));
        }
        if !(0 ..= MAX_Q_VALUE).contains(&settings.max_q_for_session_s1) {
            return Err(ConfigError::Invalid(format!(
                "reference.max_q_for_session_s1 must be within [0, {MAX_Q_VALUE}]"
            )));
        }
        if settings.population_factor == 0 {
            return Err(ConfigError::Invalid(
                "reference.population_factor must be at least 1".to_string(),
            ));
        }
        if settings.max_select_filters < 0 {
            return Err(ConfigError::Invalid(
                "reference.max_select_filters must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// One named, versioned profile.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    /// Profile name.
    pub name: ProfileName,
    /// Profile version (at least 1).
    pub version: u32,
    /// Field values.
    #[serde(default)]
    pub values: Profile,
    /// Fill unset fields from the schema defaults before registering.
    #[serde(default = "default_true")]
    pub merge_defaults: bool,
}

impl ProfileConfig {
    /// Validates the profile header.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_identifier("profiles.name", self.name.as_str())?;
        if self.version == 0 {
            return Err(ConfigError::Invalid(format!(
                "profiles.version for {} must be at least 1",
                self.name
            )));
        }
        for (name, _) in self.values.iter() {
            validate_identifier("profiles.values", name.as_str())?;
        }
        Ok(())
    }
}

/// Serde default for opt-out booleans.
const fn default_true() -> bool {
    true
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading, validation, or build errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration or opening the audit log.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// A configured field could not be defined.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// A configured constraint or table row was rejected.
    #[error(transparent)]
    Constraint(#[from] ConstraintError),
    /// A configured profile could not be registered.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the caller or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a section's entry count.
fn validate_count(section: &str, count: usize, max: usize) -> Result<(), ConfigError> {
    if count > max {
        return Err(ConfigError::Invalid(format!("{section} exceeds {max} entries")));
    }
    Ok(())
}

/// Validates a name, id, code, or symbol.
fn validate_identifier(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if value.trim() != value {
        return Err(ConfigError::Invalid(format!(
            "{field} must not have surrounding whitespace: {value:?}"
        )));
    }
    if value.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ConfigError::Invalid(format!(
            "{field} exceeds {MAX_IDENTIFIER_LENGTH} bytes"
        )));
    }
    Ok(())
}

/// Validates the text parts of a configured constraint.
fn validate_constraint(constraint: &Constraint) -> Result<(), ConfigError> {
    validate_identifier("constraints.id", constraint.id.as_str())?;
    validate_identifier("constraints.code", &constraint.code)?;
    if constraint.rationale.len() > MAX_RATIONALE_LENGTH {
        return Err(ConfigError::Invalid(format!(
            "constraints.rationale for {} exceeds {MAX_RATIONALE_LENGTH} bytes",
            constraint.id
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
