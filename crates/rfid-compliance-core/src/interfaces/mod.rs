// crates/rfid-compliance-core/src/interfaces/mod.rs
// ============================================================================
// Module: Compliance Interfaces
// Description: Seams between the engine and its surrounding system.
// Purpose: Let deployments route audit events without touching the engine.
// Dependencies: crate::runtime::audit
// ============================================================================

//! ## Overview
//! The engine reports what it did through an [`AuditSink`]. Sinks observe
//! events only; nothing they do can change a verdict. Implementations must be
//! safe to call from many evaluating threads at once.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::runtime::audit::EvaluationAuditEvent;
use crate::runtime::audit::SetupAuditEvent;

// ============================================================================
// SECTION: Audit Sink
// ============================================================================

/// Destination for structured audit events.
pub trait AuditSink: Send + Sync {
    /// Records the outcome of one evaluation.
    fn record_evaluation(&self, event: &EvaluationAuditEvent);

    /// Records a completed setup phase.
    fn record_setup(&self, _event: &SetupAuditEvent) {}
}
