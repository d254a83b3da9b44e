// crates/rfid-compliance-core/src/runtime/mod.rs
// ============================================================================
// Module: Compliance Runtime
// Description: Engine, registry, and audit sinks.
// Purpose: Group the components that act on the core data model.
// Dependencies: crate::runtime::*
// ============================================================================

//! ## Overview
//! The runtime acts on sealed core data without mutating it. The engine and
//! registry are read-only after setup; audit sinks are the only component
//! that performs I/O.

pub mod audit;
pub mod engine;
pub mod registry;

pub use audit::EvaluationAuditEvent;
pub use audit::EvaluationKind;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::SetupAuditEvent;
pub use audit::SetupAuditEventParams;
pub use audit::StderrAuditSink;
pub use engine::AcceptedProfile;
pub use engine::Admission;
pub use engine::ComplianceEngine;
pub use engine::EngineError;
pub use registry::ProfileRegistry;
pub use registry::RegistryError;
