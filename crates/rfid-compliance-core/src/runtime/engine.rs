// crates/rfid-compliance-core/src/runtime/engine.rs
// ============================================================================
// Module: Compliance Engine
// Description: Evaluates profiles against a schema and constraint set.
// Purpose: Produce deterministic verdicts and admit compliant profiles.
// Dependencies: crate::{core, interfaces, runtime::audit}, rfid-rules, thiserror
// ============================================================================

//! ## Overview
//! Evaluation runs in two phases. First every field is checked against its
//! schema domain; failures become hard-fail entries and mark the field
//! invalid. Then constraints run in insertion order. A constraint that reads
//! an invalid field is never evaluated; it is listed as skipped so predicates
//! only ever see well-typed inputs.
//!
//! The verdict is a pure function of `(profile, constraints, schema)`. The
//! engine holds no mutable state; the audit sink is notified after the
//! verdict is final and cannot influence it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use rfid_rules::RuleTrace;
use thiserror::Error;

use crate::core::Check;
use crate::core::CheckContext;
use crate::core::Constraint;
use crate::core::ConstraintError;
use crate::core::ConstraintId;
use crate::core::ConstraintSet;
use crate::core::EntrySource;
use crate::core::FieldName;
use crate::core::ParameterSchema;
use crate::core::Profile;
use crate::core::ProfileError;
use crate::core::SchemaError;
use crate::core::Severity;
use crate::core::Verdict;
use crate::core::VerdictEntry;
use crate::interfaces::AuditSink;
use crate::runtime::audit::EvaluationAuditEvent;
use crate::runtime::audit::EvaluationKind;
use crate::runtime::audit::NoopAuditSink;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Structural failures that prevent evaluation.
///
/// A non-compliant profile is not an error; it yields a normal [`Verdict`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The profile is incomplete.
    #[error(transparent)]
    Profile(#[from] ProfileError),
    /// The profile names a field the schema does not define.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// The constraint set reads a field the schema does not define.
    #[error(transparent)]
    Constraint(#[from] ConstraintError),
}

// ============================================================================
// SECTION: Admission
// ============================================================================

/// Complete, compliant profile together with the verdict that admitted it.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedProfile {
    /// Admitted profile.
    profile: Profile,
    /// Verdict that admitted it.
    verdict: Verdict,
}

impl AcceptedProfile {
    /// Returns the admitted profile.
    #[must_use]
    pub const fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Returns the admitting verdict; it may still carry warnings.
    #[must_use]
    pub const fn verdict(&self) -> &Verdict {
        &self.verdict
    }

    /// Splits into profile and verdict.
    #[must_use]
    pub fn into_parts(self) -> (Profile, Verdict) {
        (self.profile, self.verdict)
    }
}

/// Outcome of [`ComplianceEngine::admit`].
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    /// The profile is compliant and may be applied.
    Accepted(AcceptedProfile),
    /// The profile is non-compliant; the verdict lists why.
    Rejected(Verdict),
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Stateless evaluator of profiles.
#[derive(Clone)]
pub struct ComplianceEngine {
    /// Destination for evaluation audit events.
    audit: Arc<dyn AuditSink>,
}

impl fmt::Debug for ComplianceEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComplianceEngine").finish_non_exhaustive()
    }
}

impl Default for ComplianceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ComplianceEngine {
    /// Creates an engine that discards audit events.
    #[must_use]
    pub fn new() -> Self {
        Self::with_audit(Arc::new(NoopAuditSink))
    }

    /// Creates an engine reporting to the given audit sink.
    #[must_use]
    pub fn with_audit(audit: Arc<dyn AuditSink>) -> Self {
        Self {
            audit,
        }
    }

    /// Evaluates a complete profile.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Profile`] for incomplete profiles,
    /// [`EngineError::Schema`] when the profile sets an unknown field, and
    /// [`EngineError::Constraint`] when a constraint reads an unknown field.
    pub fn evaluate(
        &self,
        profile: &Profile,
        constraints: &ConstraintSet,
        schema: &ParameterSchema,
    ) -> Result<Verdict, EngineError> {
        let verdict = evaluate_profile(profile, constraints, schema, None)?;
        self.audit.record_evaluation(&EvaluationAuditEvent::new(
            EvaluationKind::Evaluate,
            None,
            profile,
            &verdict,
        ));
        Ok(verdict)
    }

    /// Re-validates one field: its domain check and the constraints touching it.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Self::evaluate`], plus
    /// [`EngineError::Schema`] when `field` is not defined.
    pub fn evaluate_field(
        &self,
        profile: &Profile,
        field: &str,
        constraints: &ConstraintSet,
        schema: &ParameterSchema,
    ) -> Result<Verdict, EngineError> {
        let focus = schema.describe(field)?.name.clone();
        let verdict = evaluate_profile(profile, constraints, schema, Some(&focus))?;
        self.audit.record_evaluation(&EvaluationAuditEvent::new(
            EvaluationKind::EvaluateField,
            Some(focus),
            profile,
            &verdict,
        ));
        Ok(verdict)
    }

    /// Evaluates a profile and admits it when compliant.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Self::evaluate`].
    pub fn admit(
        &self,
        profile: &Profile,
        constraints: &ConstraintSet,
        schema: &ParameterSchema,
    ) -> Result<Admission, EngineError> {
        let verdict = evaluate_profile(profile, constraints, schema, None)?;
        self.audit.record_evaluation(&EvaluationAuditEvent::new(
            EvaluationKind::Admit,
            None,
            profile,
            &verdict,
        ));
        if verdict.is_compliant() {
            Ok(Admission::Accepted(AcceptedProfile {
                profile: profile.clone(),
                verdict,
            }))
        } else {
            Ok(Admission::Rejected(verdict))
        }
    }
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

/// Runs both evaluation phases, optionally restricted to one field.
fn evaluate_profile(
    profile: &Profile,
    constraints: &ConstraintSet,
    schema: &ParameterSchema,
    focus: Option<&FieldName>,
) -> Result<Verdict, EngineError> {
    check_preconditions(profile, constraints, schema)?;

    let mut entries = Vec::new();
    let mut invalid: BTreeSet<&FieldName> = BTreeSet::new();
    for field in schema.fields() {
        let Some(value) = profile.get(field.name.as_str()) else {
            continue;
        };
        let Err(violation) = field.check(value) else {
            continue;
        };
        invalid.insert(&field.name);
        if focus.is_some_and(|focus| *focus != field.name) {
            continue;
        }
        entries.push(VerdictEntry {
            id: format!("field:{}", field.name),
            source: EntrySource::FieldDomain,
            severity: Severity::HardFail,
            passed: false,
            code: violation.code(&field.name),
            message: violation.message(&field.name, value),
            fields: vec![field.name.clone()],
        });
    }

    let context = CheckContext {
        profile,
        tables: constraints.tables(),
    };
    let mut skipped: Vec<ConstraintId> = Vec::new();
    for constraint in constraints.constraints() {
        if let Some(focus) = focus
            && !constraint.touches(focus.as_str())
        {
            continue;
        }
        let scope = constraint.scope();
        if scope.iter().any(|field| invalid.contains(*field)) {
            skipped.push(constraint.id.clone());
            continue;
        }
        entries.push(evaluate_constraint(constraint, scope, &context));
    }

    Ok(Verdict::from_entries(entries, skipped))
}

/// Rejects inputs the engine cannot evaluate.
fn check_preconditions(
    profile: &Profile,
    constraints: &ConstraintSet,
    schema: &ParameterSchema,
) -> Result<(), EngineError> {
    let missing = profile.missing_fields(schema);
    if !missing.is_empty() {
        return Err(ProfileError::IncompleteProfile {
            missing,
        }
        .into());
    }
    if let Some(unknown) = profile.unknown_fields(schema).into_iter().next() {
        return Err(SchemaError::UnknownField(unknown).into());
    }
    for constraint in constraints.constraints() {
        if let Some(field) =
            constraint.scope().into_iter().find(|field| !schema.contains(field.as_str()))
        {
            return Err(ConstraintError::UnknownFieldReference {
                constraint: constraint.id.clone(),
                field: field.clone(),
            }
            .into());
        }
    }
    Ok(())
}

/// Evaluates one constraint and renders its entry.
fn evaluate_constraint(
    constraint: &Constraint,
    scope: Vec<&FieldName>,
    context: &CheckContext<'_>,
) -> VerdictEntry {
    let mut observed = ObservedFields::default();
    let passed = constraint.rule.eval_with_trace(context, &mut observed);
    let message = if passed {
        format!("{}: satisfied", constraint.id)
    } else {
        let values: Vec<String> = observed
            .fields
            .iter()
            .filter_map(|field| {
                context.profile.get(field.as_str()).map(|value| format!("{field}={value}"))
            })
            .collect();
        format!("{}: {} (observed: {})", constraint.code, constraint.rationale, values.join(", "))
    };
    VerdictEntry {
        id: constraint.id.to_string(),
        source: EntrySource::Constraint,
        severity: constraint.severity,
        passed,
        code: constraint.code.clone(),
        message,
        fields: scope.into_iter().cloned().collect(),
    }
}

// ============================================================================
// SECTION: Trace
// ============================================================================

/// Collects the fields read by evaluated checks, in first-read order.
#[derive(Default)]
struct ObservedFields {
    /// Fields read so far.
    fields: Vec<FieldName>,
}

impl RuleTrace<Check> for ObservedFields {
    fn on_check(&mut self, check: &Check, _passed: bool) {
        for field in check.scope() {
            if !self.fields.contains(field) {
                self.fields.push(field.clone());
            }
        }
    }
}
