// crates/rfid-compliance-core/src/core/mod.rs
// ============================================================================
// Module: Compliance Core Types
// Description: Schema, profile, constraint, and verdict data model.
// Purpose: Group the pure data types the engine evaluates.
// Dependencies: crate::core::*
// ============================================================================

//! ## Overview
//! Everything in this module is plain data plus pure functions over it. No
//! type here performs I/O or holds interior mutability, so sealed schemas and
//! constraint sets can be shared across threads freely.

pub mod check;
pub mod constraint;
pub mod hashing;
pub mod identifiers;
pub mod profile;
pub mod schema;
pub mod tables;
pub mod value;
pub mod verdict;

pub use check::Check;
pub use check::CheckContext;
pub use check::Comparator;
pub use check::ModeAttribute;
pub use constraint::Constraint;
pub use constraint::ConstraintError;
pub use constraint::ConstraintSet;
pub use constraint::Severity;
pub use hashing::Fingerprint;
pub use hashing::FingerprintAlgorithm;
pub use hashing::FingerprintError;
pub use identifiers::ConstraintId;
pub use identifiers::FieldName;
pub use identifiers::ProfileName;
pub use identifiers::ProfileVersion;
pub use profile::Profile;
pub use profile::ProfileError;
pub use schema::Domain;
pub use schema::DomainViolation;
pub use schema::Field;
pub use schema::ParameterSchema;
pub use schema::SchemaError;
pub use schema::SemanticType;
pub use tables::ForwardLinkModulation;
pub use tables::ReferenceTables;
pub use tables::RegionLimits;
pub use tables::RfMode;
pub use tables::SpectralMask;
pub use value::ParamValue;
pub use value::ValueRange;
pub use verdict::ComplianceStatus;
pub use verdict::EntrySource;
pub use verdict::Verdict;
pub use verdict::VerdictEntry;
