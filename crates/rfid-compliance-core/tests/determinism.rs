// crates/rfid-compliance-core/tests/determinism.rs
// ============================================================================
// Module: Determinism and Concurrency Tests
// Description: Property and multi-threaded checks of evaluation purity.
// Purpose: Ensure verdicts are reproducible and safely shareable inputs.
// ============================================================================

//! ## Overview
//! Property tests over generated reference profiles plus a multi-threaded
//! evaluation run against one shared schema and constraint set.

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
    reason = "Test-only assertions and helpers are permitted."
)]

use std::sync::Arc;
use std::thread;

use proptest::prelude::*;
use rfid_compliance_core::ComplianceEngine;
use rfid_compliance_core::EntrySource;
use rfid_compliance_core::ParamValue;
use rfid_compliance_core::Profile;
use rfid_compliance_core::ReferenceSettings;
use rfid_compliance_core::Verdict;
use rfid_compliance_core::reference;

type TestResult = Result<(), String>;

// ============================================================================
// SECTION: Strategies
// ============================================================================

/// Generates complete reference profiles, some with out-of-domain values.
fn reference_profile() -> impl Strategy<Value = Profile> {
    (
        prop::sample::select(vec![1000_i64, 1002, 1003, 1004, 1005, 1001]),
        prop::sample::select(vec!["S0", "S1", "S2", "S3", "S7"]),
        0_i64 .. 18,
        prop::sample::select(vec![6.25, 12.5, 20.0, 25.0, 30.0]),
        1_i64 .. 2_000,
        0_i64 .. 10,
        prop::sample::select(vec!["FCC", "ETSI_UPPER", "JP", "CN"]),
    )
        .prop_map(|(mode, session, q, tari, population, filters, region)| {
            let overrides = Profile::from_values([
                (reference::RF_MODE, ParamValue::Integer(mode)),
                (reference::SESSION, ParamValue::text(session)),
                (reference::Q_VALUE, ParamValue::Integer(q)),
                (reference::TARI, ParamValue::Float(tari)),
                (reference::TAG_POPULATION, ParamValue::Integer(population)),
                (reference::SELECT_FILTERS, ParamValue::Integer(filters)),
                (reference::REGION, ParamValue::text(region)),
            ]);
            overrides.merge(&reference::industrial_conservative_profile())
        })
}

proptest! {
    #[test]
    fn evaluation_is_deterministic(profile in reference_profile()) {
        let schema = reference::industrial_schema().unwrap();
        let set = reference::industrial_constraints(&schema, &ReferenceSettings::default()).unwrap();
        let engine = ComplianceEngine::new();
        let first = engine.evaluate(&profile, &set, &schema).unwrap();
        let second = engine.evaluate(&profile, &set, &schema).unwrap();
        prop_assert_eq!(first.fingerprint().unwrap(), second.fingerprint().unwrap());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn domain_failures_precede_constraint_entries(profile in reference_profile()) {
        let schema = reference::industrial_schema().unwrap();
        let set = reference::industrial_constraints(&schema, &ReferenceSettings::default()).unwrap();
        let verdict = ComplianceEngine::new().evaluate(&profile, &set, &schema).unwrap();
        let sources: Vec<EntrySource> = verdict.entries().iter().map(|entry| entry.source).collect();
        let first_constraint = sources
            .iter()
            .position(|source| *source == EntrySource::Constraint)
            .unwrap_or(sources.len());
        prop_assert!(sources[first_constraint ..].iter().all(|source| *source == EntrySource::Constraint));
        for entry in verdict.entries().iter().filter(|entry| entry.source == EntrySource::FieldDomain) {
            let field = entry.fields[0].as_str();
            for touching in set.constraints_touching(field) {
                prop_assert!(verdict.entry(touching.id.as_str()).is_none());
                prop_assert!(verdict.skipped().contains(&touching.id));
            }
        }
    }

    #[test]
    fn warnings_never_change_status(profile in reference_profile()) {
        let schema = reference::industrial_schema().unwrap();
        let set = reference::industrial_constraints(&schema, &ReferenceSettings::default()).unwrap();
        let verdict = ComplianceEngine::new().evaluate(&profile, &set, &schema).unwrap();
        prop_assert_eq!(verdict.is_compliant(), verdict.failures().count() == 0);
    }
}

// ============================================================================
// SECTION: Concurrency
// ============================================================================

#[test]
fn concurrent_evaluations_share_sealed_inputs() -> TestResult {
    let schema = Arc::new(reference::industrial_schema().map_err(|err| err.to_string())?);
    let set = Arc::new(
        reference::industrial_constraints(&schema, &ReferenceSettings::default())
            .map_err(|err| err.to_string())?,
    );
    let engine = ComplianceEngine::new();
    let profiles: Vec<Profile> = (0_i64 .. 16)
        .map(|q| {
            Profile::from_values([(reference::Q_VALUE, ParamValue::Integer(q))])
                .merge(&reference::industrial_conservative_profile())
        })
        .collect();
    let expected: Vec<Verdict> = profiles
        .iter()
        .map(|profile| engine.evaluate(profile, &set, &schema))
        .collect::<Result<_, _>>()
        .map_err(|err| err.to_string())?;

    let results: Vec<Result<Vec<Verdict>, String>> = thread::scope(|scope| {
        let handles: Vec<_> = (0 .. 8)
            .map(|_| {
                let schema = Arc::clone(&schema);
                let set = Arc::clone(&set);
                let engine = engine.clone();
                let profiles = &profiles;
                scope.spawn(move || {
                    profiles
                        .iter()
                        .map(|profile| engine.evaluate(profile, &set, &schema))
                        .collect::<Result<Vec<_>, _>>()
                        .map_err(|err| err.to_string())
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle.join().unwrap_or_else(|_| Err("evaluator thread panicked".to_string()))
            })
            .collect()
    });

    for result in results {
        if result? != expected {
            return Err("concurrent verdicts differ from sequential ones".to_string());
        }
    }
    Ok(())
}
