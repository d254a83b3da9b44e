// crates/rfid-compliance-core/src/runtime/audit.rs
// ============================================================================
// Module: Compliance Audit Logging
// Description: Structured audit events and JSON-lines sinks.
// Purpose: Record evaluations and setup without a logging framework.
// Dependencies: crate::{core, interfaces}, serde, serde_json
// ============================================================================

//! ## Overview
//! Audit events are serialized as one JSON object per line. Events carry
//! counts, ids, and fingerprints only; profile values never leave the engine
//! through the audit path. Sink write failures are swallowed so auditing can
//! never change an evaluation's outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::ComplianceStatus;
use crate::core::FieldName;
use crate::core::Profile;
use crate::core::Verdict;
use crate::interfaces::AuditSink;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Engine operation that produced an evaluation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationKind {
    /// Full evaluation.
    Evaluate,
    /// Single-field re-validation.
    EvaluateField,
    /// Evaluation followed by admission.
    Admit,
}

/// Audit record of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Operation that ran.
    pub operation: EvaluationKind,
    /// Field re-validated by `evaluate_field`.
    pub focus_field: Option<FieldName>,
    /// Overall status.
    pub status: ComplianceStatus,
    /// Number of failed hard-fail entries.
    pub hard_failures: usize,
    /// Number of failed warning entries.
    pub warnings: usize,
    /// Number of skipped constraints.
    pub skipped: usize,
    /// Ids of failed entries in verdict order.
    pub failed_ids: Vec<String>,
    /// Profile fingerprint when it could be computed.
    pub profile_fingerprint: Option<String>,
    /// Verdict fingerprint when it could be computed.
    pub verdict_fingerprint: Option<String>,
}

impl EvaluationAuditEvent {
    /// Summarizes an evaluation with a consistent timestamp.
    #[must_use]
    pub fn new(
        operation: EvaluationKind,
        focus_field: Option<FieldName>,
        profile: &Profile,
        verdict: &Verdict,
    ) -> Self {
        Self {
            event: "compliance_evaluation",
            timestamp_ms: unix_millis(),
            operation,
            focus_field,
            status: verdict.status(),
            hard_failures: verdict.failures().count(),
            warnings: verdict.warnings().count(),
            skipped: verdict.skipped().len(),
            failed_ids: verdict
                .entries()
                .iter()
                .filter(|entry| !entry.passed)
                .map(|entry| entry.id.clone())
                .collect(),
            profile_fingerprint: profile.fingerprint().ok().map(|print| print.to_string()),
            verdict_fingerprint: verdict.fingerprint().ok().map(|print| print.to_string()),
        }
    }
}

/// Inputs required to construct a setup audit event.
pub struct SetupAuditEventParams {
    /// Where the configuration came from (path or `builtin`).
    pub source: String,
    /// Number of schema fields.
    pub fields: usize,
    /// Number of constraints.
    pub constraints: usize,
    /// Number of RF mode rows.
    pub rf_modes: usize,
    /// Number of region rows.
    pub regions: usize,
    /// Number of registered profile versions.
    pub profiles: usize,
}

/// Audit record of a completed setup phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Where the configuration came from.
    pub source: String,
    /// Number of schema fields.
    pub fields: usize,
    /// Number of constraints.
    pub constraints: usize,
    /// Number of RF mode rows.
    pub rf_modes: usize,
    /// Number of region rows.
    pub regions: usize,
    /// Number of registered profile versions.
    pub profiles: usize,
}

impl SetupAuditEvent {
    /// Creates a setup event with a consistent timestamp.
    #[must_use]
    pub fn new(params: SetupAuditEventParams) -> Self {
        Self {
            event: "compliance_setup",
            timestamp_ms: unix_millis(),
            source: params.source,
            fields: params.fields,
            constraints: params.constraints,
            rf_modes: params.rf_modes,
            regions: params.regions,
            profiles: params.profiles,
        }
    }
}

/// Returns the current unix epoch in milliseconds.
fn unix_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

/// Writes one event as a JSON line, ignoring failures.
fn write_json_line<W: Write, E: Serialize>(writer: &mut W, event: &E) {
    if let Ok(payload) = serde_json::to_string(event) {
        let _ = writeln!(writer, "{payload}");
        let _ = writer.flush();
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink that logs JSON lines to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record_evaluation(&self, event: &EvaluationAuditEvent) {
        write_json_line(&mut io::stderr(), event);
    }

    fn record_setup(&self, event: &SetupAuditEvent) {
        write_json_line(&mut io::stderr(), event);
    }
}

/// Audit sink that appends JSON lines to a file.
#[derive(Debug)]
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn record_evaluation(&self, event: &EvaluationAuditEvent) {
        if let Ok(mut file) = self.file.lock() {
            write_json_line(&mut *file, event);
        }
    }

    fn record_setup(&self, event: &SetupAuditEvent) {
        if let Ok(mut file) = self.file.lock() {
            write_json_line(&mut *file, event);
        }
    }
}

/// No-op audit sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record_evaluation(&self, _event: &EvaluationAuditEvent) {}
}
