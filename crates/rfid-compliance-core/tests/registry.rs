// crates/rfid-compliance-core/tests/registry.rs
// ============================================================================
// Module: Profile Registry Tests
// Description: Registration conflicts and version resolution.
// Purpose: Ensure named profiles resolve to the intended version.
// ============================================================================

//! ## Overview
//! Integration tests for `ProfileRegistry`.

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

use rfid_compliance_core::ParamValue;
use rfid_compliance_core::Profile;
use rfid_compliance_core::ProfileRegistry;
use rfid_compliance_core::ProfileVersion;
use rfid_compliance_core::RegistryError;
use rfid_compliance_core::reference;
use rfid_compliance_core::reference::INDUSTRIAL_CONSERVATIVE;

type TestResult = Result<(), String>;

fn ensure(condition: bool, message: &str) -> TestResult {
    if condition { Ok(()) } else { Err(message.to_string()) }
}

fn with_q(q: i64) -> Profile {
    Profile::from_values([("q_value", ParamValue::Integer(q))])
        .merge(&reference::industrial_conservative_profile())
}

#[test]
fn resolve_without_version_returns_the_highest() -> TestResult {
    let mut registry = ProfileRegistry::new();
    registry.register(INDUSTRIAL_CONSERVATIVE, 2, with_q(0)).map_err(|err| err.to_string())?;
    registry.register(INDUSTRIAL_CONSERVATIVE, 1, with_q(1)).map_err(|err| err.to_string())?;
    let latest = registry.resolve(INDUSTRIAL_CONSERVATIVE, None).map_err(|err| err.to_string())?;
    ensure(latest.get("q_value") == Some(&ParamValue::Integer(0)), "version 2 expected")?;
    let first = registry
        .resolve(INDUSTRIAL_CONSERVATIVE, Some(ProfileVersion::new(1)))
        .map_err(|err| err.to_string())?;
    ensure(first.get("q_value") == Some(&ParamValue::Integer(1)), "version 1 expected")?;
    ensure(
        registry.latest_version(INDUSTRIAL_CONSERVATIVE) == Some(ProfileVersion::new(2)),
        "latest version should be 2",
    )?;
    ensure(
        registry.versions(INDUSTRIAL_CONSERVATIVE) == [ProfileVersion::new(1), ProfileVersion::new(2)],
        "versions should be ascending",
    )
}

#[test]
fn duplicate_versions_conflict() -> TestResult {
    let mut registry = ProfileRegistry::new();
    registry.register(INDUSTRIAL_CONSERVATIVE, 1, with_q(1)).map_err(|err| err.to_string())?;
    match registry.register(INDUSTRIAL_CONSERVATIVE, 1, with_q(0)) {
        Err(RegistryError::VersionConflict {
            version, ..
        }) if version == ProfileVersion::new(1) => {}
        other => return Err(format!("unexpected result {other:?}")),
    }
    let kept = registry.resolve(INDUSTRIAL_CONSERVATIVE, None).map_err(|err| err.to_string())?;
    ensure(kept.get("q_value") == Some(&ParamValue::Integer(1)), "original must be kept")?;
    ensure(registry.len() == 1, "conflict must not add an entry")
}

#[test]
fn missing_names_and_versions_are_not_found() -> TestResult {
    let mut registry = ProfileRegistry::new();
    registry.register(INDUSTRIAL_CONSERVATIVE, 1, with_q(1)).map_err(|err| err.to_string())?;
    match registry.resolve("warehouse-fast", None) {
        Err(RegistryError::NotFound {
            name,
            version: None,
        }) if name.as_str() == "warehouse-fast" => {}
        other => return Err(format!("unexpected result {other:?}")),
    }
    let err = registry
        .resolve(INDUSTRIAL_CONSERVATIVE, Some(ProfileVersion::new(7)))
        .err()
        .ok_or("version 7 should not resolve")?;
    ensure(
        err.to_string() == "profile industrial-conservative not found at v7",
        &err.to_string(),
    )?;
    let names: Vec<&str> = registry.names().map(|name| name.as_str()).collect();
    ensure(names == [INDUSTRIAL_CONSERVATIVE], "unexpected names")
}
