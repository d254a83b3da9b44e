// crates/rfid-compliance-core/tests/engine.rs
// ============================================================================
// Module: Compliance Engine Tests
// Description: Reference scenarios, phase ordering, admission, and audit.
// Purpose: Pin down verdict contents for the industrial reference table.
// ============================================================================

//! ## Overview
//! Scenario tests for `ComplianceEngine` against the built-in reference table.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;
use std::sync::Mutex;

use rfid_compliance_core::Admission;
use rfid_compliance_core::AuditSink;
use rfid_compliance_core::ComplianceEngine;
use rfid_compliance_core::ComplianceStatus;
use rfid_compliance_core::ConstraintError;
use rfid_compliance_core::ConstraintSet;
use rfid_compliance_core::EngineError;
use rfid_compliance_core::EntrySource;
use rfid_compliance_core::EvaluationAuditEvent;
use rfid_compliance_core::EvaluationKind;
use rfid_compliance_core::ParamValue;
use rfid_compliance_core::ParameterSchema;
use rfid_compliance_core::Profile;
use rfid_compliance_core::ProfileError;
use rfid_compliance_core::ReferenceSettings;
use rfid_compliance_core::SchemaError;
use rfid_compliance_core::Severity;
use rfid_compliance_core::Verdict;
use rfid_compliance_core::reference;

type TestResult = Result<(), String>;

fn ensure(condition: bool, message: &str) -> TestResult {
    if condition { Ok(()) } else { Err(message.to_string()) }
}

/// Reference schema and constraint set.
fn fixture() -> Result<(ParameterSchema, ConstraintSet), String> {
    let schema = reference::industrial_schema().map_err(|err| err.to_string())?;
    let set = reference::industrial_constraints(&schema, &ReferenceSettings::default())
        .map_err(|err| err.to_string())?;
    Ok((schema, set))
}

/// Conservative profile with the given overrides applied.
fn conservative_with(
    schema: &ParameterSchema,
    overrides: &[(&str, ParamValue)],
) -> Result<Profile, String> {
    overrides.iter().try_fold(reference::industrial_conservative_profile(), |profile, (name, value)| {
        profile.with_field(schema, name, value.clone()).map_err(|err| err.to_string())
    })
}

fn evaluate(profile: &Profile) -> Result<Verdict, String> {
    let (schema, set) = fixture()?;
    ComplianceEngine::new().evaluate(profile, &set, &schema).map_err(|err| err.to_string())
}

// ============================================================================
// SECTION: Reference Scenarios
// ============================================================================

#[test]
fn conservative_profile_is_compliant_without_warnings() -> TestResult {
    let verdict = evaluate(&reference::industrial_conservative_profile())?;
    ensure(verdict.status() == ComplianceStatus::Compliant, "conservative profile rejected")?;
    ensure(verdict.warnings().count() == 0, "conservative profile should not warn")?;
    ensure(verdict.skipped().is_empty(), "nothing should be skipped")?;
    ensure(verdict.entries().len() == 11, "one entry per constraint")?;
    ensure(verdict.entries().iter().all(|entry| entry.passed), "every constraint should pass")?;
    let entry = verdict.entry("q-value-bounds").ok_or("missing q-value-bounds entry")?;
    ensure(entry.message == "q-value-bounds: satisfied", &entry.message)
}

#[test]
fn q_value_sixteen_is_non_compliant_with_out_of_range_code() -> TestResult {
    let (schema, _) = fixture()?;
    let profile = conservative_with(&schema, &[("q_value", ParamValue::Integer(16))])?;
    let verdict = evaluate(&profile)?;
    ensure(verdict.status() == ComplianceStatus::NonCompliant, "Q=16 accepted")?;
    let first = verdict.entries().first().ok_or("verdict has no entries")?;
    ensure(first.id == "field:q_value", &format!("first entry concerns {}", first.id))?;
    ensure(first.source == EntrySource::FieldDomain, "first entry should be a domain check")?;
    ensure(first.code == "QValueOutOfRange", &first.code)?;
    ensure(first.message.contains("QValueOutOfRange"), &first.message)
}

#[test]
fn constraints_reading_invalid_fields_are_skipped() -> TestResult {
    let (schema, _) = fixture()?;
    let profile = conservative_with(&schema, &[("q_value", ParamValue::Integer(16))])?;
    let verdict = evaluate(&profile)?;
    let skipped: Vec<&str> = verdict.skipped().iter().map(|id| id.as_str()).collect();
    ensure(
        skipped == ["q-value-bounds", "q-value-session-preference", "q-value-population"],
        &format!("unexpected skipped constraints {skipped:?}"),
    )?;
    ensure(verdict.entry("q-value-bounds").is_none(), "skipped constraint must not be evaluated")?;
    ensure(verdict.entries().len() == 1 + 8, "one domain entry plus eight evaluated constraints")
}

#[test]
fn session_s0_with_short_tari_warns_once() -> TestResult {
    let (schema, _) = fixture()?;
    let profile = conservative_with(
        &schema,
        &[("session", ParamValue::text("S0")), ("tari", ParamValue::Float(6.25))],
    )?;
    let verdict = evaluate(&profile)?;
    ensure(verdict.status() == ComplianceStatus::Compliant, "warnings must not reject")?;
    let warnings: Vec<&str> = verdict.warnings().map(|entry| entry.id.as_str()).collect();
    ensure(warnings == ["session-tari-interaction"], &format!("unexpected warnings {warnings:?}"))?;
    let entry = verdict.entry("session-tari-interaction").ok_or("missing warning entry")?;
    ensure(entry.severity == Severity::Warning, "entry should be a warning")?;
    ensure(
        entry.message.starts_with("ShortTariWithoutPersistence: ")
            && entry.message.contains("session=S0")
            && entry.message.contains("tari=6.25"),
        &entry.message,
    )
}

#[test]
fn high_q_under_session_s1_warns() -> TestResult {
    let (schema, _) = fixture()?;
    let profile = conservative_with(
        &schema,
        &[("q_value", ParamValue::Integer(4)), ("tag_population", ParamValue::Integer(16))],
    )?;
    let verdict = evaluate(&profile)?;
    ensure(verdict.is_compliant(), "warnings must not reject")?;
    let warnings: Vec<&str> = verdict.warnings().map(|entry| entry.id.as_str()).collect();
    ensure(warnings == ["q-value-session-preference"], &format!("unexpected warnings {warnings:?}"))
}

#[test]
fn fast_rf_mode_breaks_ceiling_and_mode_matches() -> TestResult {
    let (schema, _) = fixture()?;
    let profile = conservative_with(&schema, &[("rf_mode", ParamValue::Integer(1005))])?;
    let verdict = evaluate(&profile)?;
    let failures: Vec<&str> = verdict.failures().map(|entry| entry.id.as_str()).collect();
    ensure(
        failures == ["rf-mode-bdr-ceiling", "modulation-depth-range", "tari-mode-bounds"],
        &format!("unexpected failures {failures:?}"),
    )?;
    let ceiling = verdict.entry("rf-mode-bdr-ceiling").ok_or("missing ceiling entry")?;
    ensure(ceiling.message.contains("rf_mode=1005"), &ceiling.message)
}

#[test]
fn regional_limits_are_enforced() -> TestResult {
    let (schema, _) = fixture()?;
    let profile = conservative_with(
        &schema,
        &[("region", ParamValue::text("JP")), ("transmit_power", ParamValue::Float(31.5))],
    )?;
    let verdict = evaluate(&profile)?;
    let failures: Vec<&str> = verdict.failures().map(|entry| entry.id.as_str()).collect();
    ensure(
        failures == ["power-range-check", "frequency-band-region"],
        &format!("unexpected failures {failures:?}"),
    )
}

#[test]
fn identical_inputs_yield_identical_verdicts() -> TestResult {
    let (schema, _) = fixture()?;
    let profile = conservative_with(&schema, &[("select_filters", ParamValue::Integer(5))])?;
    let first = evaluate(&profile)?;
    let second = evaluate(&profile)?;
    ensure(first == second, "verdicts differ")?;
    let left = first.fingerprint().map_err(|err| err.to_string())?;
    let right = second.fingerprint().map_err(|err| err.to_string())?;
    ensure(left == right, "verdict fingerprints differ")
}

// ============================================================================
// SECTION: Structural Errors
// ============================================================================

#[test]
fn incomplete_profiles_are_rejected() -> TestResult {
    let (schema, set) = fixture()?;
    let partial = Profile::from_values([("session", ParamValue::text("S1"))]);
    match ComplianceEngine::new().evaluate(&partial, &set, &schema) {
        Err(EngineError::Profile(ProfileError::IncompleteProfile {
            missing,
        })) if missing.len() == 10 => Ok(()),
        other => Err(format!("unexpected result {other:?}")),
    }
}

#[test]
fn unknown_profile_fields_are_rejected() -> TestResult {
    let (schema, set) = fixture()?;
    let profile = reference::industrial_conservative_profile()
        .merge(&Profile::from_values([("antenna_gain", ParamValue::Integer(6))]));
    match ComplianceEngine::new().evaluate(&profile, &set, &schema) {
        Err(EngineError::Schema(SchemaError::UnknownField(name)))
            if name.as_str() == "antenna_gain" =>
        {
            Ok(())
        }
        other => Err(format!("unexpected result {other:?}")),
    }
}

#[test]
fn constraint_sets_from_other_schemas_are_rejected() -> TestResult {
    let (_, set) = fixture()?;
    let mut narrow = ParameterSchema::new();
    for field in reference::industrial_schema().map_err(|err| err.to_string())?.fields() {
        if field.name.as_str() != "select_filters" {
            narrow.define(field.clone()).map_err(|err| err.to_string())?;
        }
    }
    let profile = Profile::from_values(
        reference::industrial_conservative_profile()
            .iter()
            .filter(|(name, _)| name.as_str() != "select_filters")
            .map(|(name, value)| (name.clone(), value.clone())),
    );
    match ComplianceEngine::new().evaluate(&profile, &set, &narrow) {
        Err(EngineError::Constraint(ConstraintError::UnknownFieldReference {
            field, ..
        })) if field.as_str() == "select_filters" => Ok(()),
        other => Err(format!("unexpected result {other:?}")),
    }
}

// ============================================================================
// SECTION: Incremental Evaluation and Admission
// ============================================================================

#[test]
fn evaluate_field_limits_entries_to_the_focus() -> TestResult {
    let (schema, set) = fixture()?;
    let profile = conservative_with(
        &schema,
        &[("q_value", ParamValue::Integer(16)), ("select_filters", ParamValue::Integer(5))],
    )?;
    let engine = ComplianceEngine::new();
    let verdict =
        engine.evaluate_field(&profile, "select_filters", &set, &schema).map_err(|err| err.to_string())?;
    let ids: Vec<&str> = verdict.entries().iter().map(|entry| entry.id.as_str()).collect();
    ensure(ids == ["select-filter-limit"], &format!("unexpected entries {ids:?}"))?;
    ensure(!verdict.is_compliant(), "five filters exceed the limit")?;

    let focused =
        engine.evaluate_field(&profile, "q_value", &set, &schema).map_err(|err| err.to_string())?;
    ensure(focused.entries().len() == 1, "only the q_value domain entry is expected")?;
    ensure(focused.skipped().len() == 3, "q_value constraints should be skipped")?;
    match engine.evaluate_field(&profile, "antenna_gain", &set, &schema) {
        Err(EngineError::Schema(SchemaError::UnknownField(_))) => Ok(()),
        other => Err(format!("unexpected result {other:?}")),
    }
}

#[test]
fn admit_accepts_compliant_and_rejects_non_compliant_profiles() -> TestResult {
    let (schema, set) = fixture()?;
    let engine = ComplianceEngine::new();
    let conservative = reference::industrial_conservative_profile();
    match engine.admit(&conservative, &set, &schema).map_err(|err| err.to_string())? {
        Admission::Accepted(accepted) => {
            ensure(accepted.profile() == &conservative, "admitted profile differs")?;
            ensure(accepted.verdict().is_compliant(), "admitting verdict must be compliant")?;
        }
        Admission::Rejected(verdict) => return Err(format!("rejected: {verdict:?}")),
    }
    let noisy = conservative_with(&schema, &[("select_filters", ParamValue::Integer(8))])?;
    match engine.admit(&noisy, &set, &schema).map_err(|err| err.to_string())? {
        Admission::Rejected(verdict) => {
            ensure(verdict.failures().count() == 1, "exactly one hard failure expected")
        }
        Admission::Accepted(_) => Err("eight select filters admitted".to_string()),
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink that keeps events in memory.
#[derive(Default)]
struct MemoryAuditSink {
    /// Recorded events.
    events: Mutex<Vec<EvaluationAuditEvent>>,
}

impl AuditSink for MemoryAuditSink {
    fn record_evaluation(&self, event: &EvaluationAuditEvent) {
        self.events.lock().expect("audit events lock").push(event.clone());
    }
}

#[test]
fn every_operation_emits_one_audit_event() -> TestResult {
    let (schema, set) = fixture()?;
    let sink = Arc::new(MemoryAuditSink::default());
    let engine = ComplianceEngine::with_audit(sink.clone());
    let profile = conservative_with(&schema, &[("session", ParamValue::text("S0"))])?;

    let audited = engine.evaluate(&profile, &set, &schema).map_err(|err| err.to_string())?;
    let _ = engine.evaluate_field(&profile, "tari", &set, &schema).map_err(|err| err.to_string())?;
    let _ = engine.admit(&profile, &set, &schema).map_err(|err| err.to_string())?;
    let silent = ComplianceEngine::new().evaluate(&profile, &set, &schema).map_err(|err| err.to_string())?;
    ensure(audited == silent, "audit sink must not influence the verdict")?;

    let events = sink.events.lock().map_err(|err| err.to_string())?;
    let kinds: Vec<EvaluationKind> = events.iter().map(|event| event.operation).collect();
    ensure(
        kinds == [EvaluationKind::Evaluate, EvaluationKind::EvaluateField, EvaluationKind::Admit],
        &format!("unexpected operations {kinds:?}"),
    )?;
    let first = &events[0];
    ensure(first.event == "compliance_evaluation", "unexpected event name")?;
    ensure(first.warnings == 1 && first.hard_failures == 0, "unexpected counts")?;
    ensure(first.failed_ids == ["session-tari-interaction"], "unexpected failed ids")?;
    let expected = profile.fingerprint().map_err(|err| err.to_string())?.to_string();
    ensure(first.profile_fingerprint.as_deref() == Some(expected.as_str()), "profile fingerprint")?;
    ensure(
        events[1].focus_field.as_ref().map(|field| field.as_str()) == Some("tari"),
        "focus field should be recorded",
    )
}
