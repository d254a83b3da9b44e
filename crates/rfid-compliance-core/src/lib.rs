// crates/rfid-compliance-core/src/lib.rs
// ============================================================================
// Module: RFID Compliance Core
// Description: Reader configuration compliance engine.
// Purpose: Validate reader profiles against declarative constraint sets.
// Dependencies: crate::{core, interfaces, reference, runtime}
// ============================================================================

//! ## Overview
//! `rfid-compliance-core` accepts a proposed reader configuration and either
//! admits it as a complete, compliant profile or returns a structured verdict
//! listing every violation.
//!
//! - [`ParameterSchema`] is the type authority: fields, domains, defaults.
//! - [`ConstraintSet`] holds ordered cross-field rules and reference tables.
//! - [`ComplianceEngine`] evaluates a [`Profile`] into a [`Verdict`].
//! - [`ProfileRegistry`] stores named, versioned profiles.
//! - [`reference`] builds the industrial RF parameter table.
//!
//! Setup is single-writer; evaluation is pure and may run on many threads
//! against the same sealed schema and constraint set.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod reference;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;
pub use interfaces::AuditSink;
pub use reference::ReaderSettings;
pub use reference::ReferenceSettings;
pub use reference::SettingsError;
pub use runtime::*;
