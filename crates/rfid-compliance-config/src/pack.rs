// crates/rfid-compliance-config/src/pack.rs
// ============================================================================
// Module: Compliance Pack
// Description: Sealed schema, constraints, and profiles built from config.
// Purpose: Hand evaluators a read-only bundle they can share across threads.
// Dependencies: rfid-compliance-core
// ============================================================================

//! ## Overview
//! A [`CompliancePack`] is the output of the setup phase. Building it runs the
//! single-writer steps in order (tables, fields, seal, constraints, profiles)
//! and reports a setup audit event. Afterwards every part is immutable and
//! behind an `Arc`, so clones are cheap and evaluation needs no locking.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::sync::Arc;

use rfid_compliance_core::Admission;
use rfid_compliance_core::AuditSink;
use rfid_compliance_core::ComplianceEngine;
use rfid_compliance_core::ConstraintSet;
use rfid_compliance_core::EngineError;
use rfid_compliance_core::FileAuditSink;
use rfid_compliance_core::NoopAuditSink;
use rfid_compliance_core::ParameterSchema;
use rfid_compliance_core::Profile;
use rfid_compliance_core::ProfileRegistry;
use rfid_compliance_core::ProfileVersion;
use rfid_compliance_core::ReferenceTables;
use rfid_compliance_core::RegistryError;
use rfid_compliance_core::SetupAuditEvent;
use rfid_compliance_core::SetupAuditEventParams;
use rfid_compliance_core::StderrAuditSink;
use rfid_compliance_core::Verdict;
use rfid_compliance_core::reference;

use crate::config::AuditMode;
use crate::config::ComplianceConfig;
use crate::config::ConfigError;
use crate::config::EngineConfig;

// ============================================================================
// SECTION: Pack
// ============================================================================

/// Read-only compliance inputs plus an engine wired to the audit sink.
#[derive(Debug, Clone)]
pub struct CompliancePack {
    /// Sealed parameter schema.
    schema: Arc<ParameterSchema>,
    /// Ordered constraints and reference tables.
    constraints: Arc<ConstraintSet>,
    /// Named, versioned profiles.
    registry: Arc<ProfileRegistry>,
    /// Profile made of every field default.
    default_profile: Profile,
    /// Evaluator reporting to the configured sink.
    engine: ComplianceEngine,
}

impl CompliancePack {
    /// Builds the pack for the built-in reference table alone.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] only if the built-in definitions are malformed.
    pub fn builtin() -> Result<Self, ConfigError> {
        ComplianceConfig::default().build()
    }

    /// Runs the setup phase for a validated configuration.
    pub(crate) fn from_config(config: &ComplianceConfig) -> Result<Self, ConfigError> {
        let audit = audit_sink(&config.engine)?;
        let enabled = config.reference.enabled;

        let mut tables =
            if enabled { reference::reference_tables() } else { ReferenceTables::default() };
        tables.rf_modes.extend(config.rf_modes.iter().cloned());
        tables.regions.extend(config.regions.iter().cloned());

        let mut schema = ParameterSchema::new();
        if enabled {
            reference::define_industrial_fields(&mut schema, &tables)?;
        }
        for field in &config.fields {
            schema.define(field.clone())?;
        }
        schema.seal();

        let mut constraints = ConstraintSet::with_tables(&schema, tables)?;
        if enabled {
            reference::add_industrial_constraints(&mut constraints, &config.reference.settings)?;
        }
        for constraint in &config.constraints {
            constraints.add_constraint(constraint.clone())?;
        }

        let default_profile = schema.default_profile();
        let mut registry = ProfileRegistry::new();
        if enabled {
            registry.register(
                reference::INDUSTRIAL_CONSERVATIVE,
                1,
                reference::industrial_conservative_profile().merge(&default_profile),
            )?;
        }
        for entry in &config.profiles {
            let profile = if entry.merge_defaults {
                entry.values.merge(&default_profile)
            } else {
                entry.values.clone()
            };
            if let Some(field) = profile.unknown_fields(&schema).first() {
                return Err(ConfigError::Invalid(format!(
                    "profile {} v{} sets unknown field {field}",
                    entry.name, entry.version
                )));
            }
            registry.register(entry.name.clone(), entry.version, profile)?;
        }

        let source = config
            .source
            .as_ref()
            .map_or_else(|| "inline".to_string(), |path| path.display().to_string());
        audit.record_setup(&SetupAuditEvent::new(SetupAuditEventParams {
            source,
            fields: schema.len(),
            constraints: constraints.len(),
            rf_modes: constraints.tables().rf_modes.len(),
            regions: constraints.tables().regions.len(),
            profiles: registry.len(),
        }));

        Ok(Self {
            schema: Arc::new(schema),
            constraints: Arc::new(constraints),
            registry: Arc::new(registry),
            default_profile,
            engine: ComplianceEngine::with_audit(audit),
        })
    }

    /// Returns the sealed schema.
    #[must_use]
    pub const fn schema(&self) -> &Arc<ParameterSchema> {
        &self.schema
    }

    /// Returns the constraint set.
    #[must_use]
    pub const fn constraints(&self) -> &Arc<ConstraintSet> {
        &self.constraints
    }

    /// Returns the profile registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<ProfileRegistry> {
        &self.registry
    }

    /// Returns the profile of schema defaults, suitable for [`Profile::merge`].
    #[must_use]
    pub const fn default_profile(&self) -> &Profile {
        &self.default_profile
    }

    /// Returns the configured engine.
    #[must_use]
    pub const fn engine(&self) -> &ComplianceEngine {
        &self.engine
    }

    /// Fills unset fields of `profile` from the schema defaults.
    #[must_use]
    pub fn complete(&self, profile: &Profile) -> Profile {
        profile.merge(&self.default_profile)
    }

    /// Resolves a registered profile.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when nothing matches.
    pub fn resolve(
        &self,
        name: &str,
        version: Option<ProfileVersion>,
    ) -> Result<&Profile, RegistryError> {
        self.registry.resolve(name, version)
    }

    /// Evaluates a complete profile against the pack.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] for structural misuse such as incomplete input.
    pub fn evaluate(&self, profile: &Profile) -> Result<Verdict, EngineError> {
        self.engine.evaluate(profile, &self.constraints, &self.schema)
    }

    /// Re-validates one field of a complete profile.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] for structural misuse or an unknown field.
    pub fn evaluate_field(&self, profile: &Profile, field: &str) -> Result<Verdict, EngineError> {
        self.engine.evaluate_field(profile, field, &self.constraints, &self.schema)
    }

    /// Evaluates a complete profile and admits it when compliant.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] for structural misuse such as incomplete input.
    pub fn admit(&self, profile: &Profile) -> Result<Admission, EngineError> {
        self.engine.admit(profile, &self.constraints, &self.schema)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Opens the configured audit sink.
fn audit_sink(engine: &EngineConfig) -> Result<Arc<dyn AuditSink>, ConfigError> {
    match engine.audit {
        AuditMode::Disabled => Ok(Arc::new(NoopAuditSink)),
        AuditMode::Stderr => Ok(Arc::new(StderrAuditSink)),
        AuditMode::File => {
            let path = engine.audit_path.as_deref().map(str::trim).ok_or_else(|| {
                ConfigError::Invalid(
                    "engine.audit_path must be set when audit = \"file\"".to_string(),
                )
            })?;
            let sink = FileAuditSink::new(Path::new(path))
                .map_err(|err| ConfigError::Io(err.to_string()))?;
            Ok(Arc::new(sink))
        }
    }
}
