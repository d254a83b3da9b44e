// crates/rfid-compliance-core/src/core/verdict.rs
// ============================================================================
// Module: Verdicts
// Description: Outcome of evaluating a profile against a constraint set.
// Purpose: Report overall status and every recorded check in stable order.
// Dependencies: crate::core::{constraint, hashing, identifiers}, serde
// ============================================================================

//! ## Overview
//! A [`Verdict`] is built once per evaluation and is read-only afterwards.
//! Field-domain failures come first (schema order), followed by one entry per
//! evaluated constraint (insertion order). Constraints that could not be
//! evaluated because a field they read failed its domain check are listed in
//! [`Verdict::skipped`] instead of producing an entry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::core::constraint::Severity;
use crate::core::hashing::Fingerprint;
use crate::core::hashing::FingerprintError;
use crate::core::hashing::fingerprint_canonical_json;
use crate::core::identifiers::ConstraintId;
use crate::core::identifiers::FieldName;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Overall compliance status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    /// No hard-fail entry failed.
    Compliant,
    /// At least one hard-fail entry failed.
    NonCompliant,
}

/// Origin of a verdict entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    /// Schema type or domain check of a single field.
    FieldDomain,
    /// Constraint predicate.
    Constraint,
}

/// One recorded check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerdictEntry {
    /// Constraint id, or `field:<name>` for field-domain entries.
    pub id: String,
    /// Origin of the entry.
    pub source: EntrySource,
    /// Severity; field-domain entries are always hard failures.
    pub severity: Severity,
    /// Whether the check held.
    pub passed: bool,
    /// Violation code, e.g. `QValueOutOfRange`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Fields the check read.
    pub fields: Vec<FieldName>,
}

impl VerdictEntry {
    /// Returns true for a failed hard-fail entry.
    #[must_use]
    pub fn is_hard_failure(&self) -> bool {
        !self.passed && self.severity == Severity::HardFail
    }

    /// Returns true for a failed warning entry.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        !self.passed && self.severity == Severity::Warning
    }
}

// ============================================================================
// SECTION: Verdict
// ============================================================================

/// Result of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// Overall status derived from the entries.
    status: ComplianceStatus,
    /// Recorded checks in evaluation order.
    entries: Vec<VerdictEntry>,
    /// Constraints not evaluated because an input failed its domain check.
    skipped: Vec<ConstraintId>,
}

impl Verdict {
    /// Builds a verdict, deriving the status from the entries.
    pub(crate) fn from_entries(entries: Vec<VerdictEntry>, skipped: Vec<ConstraintId>) -> Self {
        let status = if entries.iter().any(VerdictEntry::is_hard_failure) {
            ComplianceStatus::NonCompliant
        } else {
            ComplianceStatus::Compliant
        };
        Self {
            status,
            entries,
            skipped,
        }
    }

    /// Returns the overall status.
    #[must_use]
    pub const fn status(&self) -> ComplianceStatus {
        self.status
    }

    /// Returns true when the status is [`ComplianceStatus::Compliant`].
    #[must_use]
    pub fn is_compliant(&self) -> bool {
        self.status == ComplianceStatus::Compliant
    }

    /// Returns every entry in evaluation order.
    #[must_use]
    pub fn entries(&self) -> &[VerdictEntry] {
        &self.entries
    }

    /// Returns the skipped constraints in insertion order.
    #[must_use]
    pub fn skipped(&self) -> &[ConstraintId] {
        &self.skipped
    }

    /// Iterates over failed hard-fail entries.
    pub fn failures(&self) -> impl Iterator<Item = &VerdictEntry> {
        self.entries.iter().filter(|entry| entry.is_hard_failure())
    }

    /// Iterates over failed warning entries.
    pub fn warnings(&self) -> impl Iterator<Item = &VerdictEntry> {
        self.entries.iter().filter(|entry| entry.is_warning())
    }

    /// Returns the entry with this id.
    #[must_use]
    pub fn entry(&self, id: &str) -> Option<&VerdictEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Computes the canonical fingerprint of this verdict.
    ///
    /// # Errors
    ///
    /// Returns [`FingerprintError`] when canonicalization fails.
    pub fn fingerprint(&self) -> Result<Fingerprint, FingerprintError> {
        fingerprint_canonical_json(self)
    }
}
