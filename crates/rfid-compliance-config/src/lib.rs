// crates/rfid-compliance-config/src/lib.rs
// ============================================================================
// Module: RFID Compliance Config Library
// Description: Configuration loading for the compliance engine.
// Purpose: Turn rfid-compliance.toml into a ready-to-query compliance pack.
// Dependencies: rfid-compliance-core, serde, toml
// ============================================================================

//! ## Overview
//! `rfid-compliance-config` is the configuration-loading collaborator of the
//! compliance core. It reads a TOML rule table with strict, fail-closed
//! limits, merges it with the built-in industrial reference table, and builds
//! a [`CompliancePack`]: a sealed schema, an ordered constraint set, a profile
//! registry, and an engine wired to the configured audit sink.
//!
//! Config inputs are untrusted; every limit violation is an error rather than
//! a silent truncation.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod pack;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use pack::CompliancePack;
