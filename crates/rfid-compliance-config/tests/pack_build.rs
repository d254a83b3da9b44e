//! Compliance pack build tests for rfid-compliance-config.
// crates/rfid-compliance-config/tests/pack_build.rs
// =============================================================================
// Module: Compliance Pack Build Tests
// Description: Build packs from TOML and evaluate profiles through them.
// Purpose: Ensure configured fields, rows, constraints, and profiles take effect.
// =============================================================================

use std::fs;
use std::thread;

use rfid_compliance_config::ComplianceConfig;
use rfid_compliance_config::CompliancePack;
use rfid_compliance_config::ConfigError;
use rfid_compliance_core::Admission;
use rfid_compliance_core::ComplianceStatus;
use rfid_compliance_core::ConstraintError;
use rfid_compliance_core::ParamValue;
use rfid_compliance_core::Profile;
use rfid_compliance_core::ProfileVersion;
use rfid_compliance_core::RegistryError;
use rfid_compliance_core::reference;
use rfid_rules::Rule;

type TestResult = Result<(), String>;

fn ensure(condition: bool, message: &str) -> TestResult {
    if condition { Ok(()) } else { Err(message.to_string()) }
}

fn build(content: &str) -> Result<CompliancePack, ConfigError> {
    ComplianceConfig::from_toml(content)?.build()
}

const DOCK_DOOR: &str = r#"
[[rf_modes]]
mode_identifier = 1010
modulation_depth = 2
bdr = 100000
pie = 2000
min_tari_us = 12.5
max_tari_us = 25.0
spectral_mask = "DI"
forward_link_modulation = "PR-ASK"

[[fields]]
name = "antenna_count"
semantic_type = "integer"
unit = "ports"
domain = { kind = "interval", min = 1, max = 8 }
default = 2

[[constraints]]
id = "dock-antenna-limit"
severity = "hard_fail"
code = "DockAntennaLimitExceeded"
rationale = "dock doors are cabled for at most four antenna ports"
rule = { check = { kind = "compare", field = "antenna_count", comparator = "less_than_or_equal", value = 4 } }

[[profiles]]
name = "industrial-conservative"
version = 2
values = { q_value = 0 }

[[profiles]]
name = "dock-door"
version = 1
values = { rf_mode = 1010, modulation_depth = 2, tari = 12.5, session = "S2", antenna_count = 4 }
"#;

// ============================================================================
// SECTION: Built-In Pack
// ============================================================================

#[test]
fn builtin_pack_admits_the_conservative_profile() -> TestResult {
    let pack = CompliancePack::builtin().map_err(|err| err.to_string())?;
    ensure(pack.schema().is_sealed(), "schema should be sealed")?;
    ensure(pack.constraints().len() == 11, "eleven reference constraints expected")?;
    let profile = pack
        .resolve(reference::INDUSTRIAL_CONSERVATIVE, None)
        .map_err(|err| err.to_string())?
        .clone();
    ensure(profile == reference::industrial_conservative_profile(), "unexpected registry entry")?;
    match pack.admit(&profile).map_err(|err| err.to_string())? {
        Admission::Accepted(accepted) => {
            ensure(accepted.verdict().status() == ComplianceStatus::Compliant, "not compliant")
        }
        Admission::Rejected(verdict) => Err(format!("rejected: {:?}", verdict.entries())),
    }
}

#[test]
fn partial_profiles_are_completed_from_defaults() -> TestResult {
    let pack = CompliancePack::builtin().map_err(|err| err.to_string())?;
    let partial = Profile::from_values([(reference::Q_VALUE, ParamValue::Integer(16))]);
    ensure(pack.evaluate(&partial).is_err(), "incomplete profiles are structural errors")?;
    let verdict = pack.evaluate(&pack.complete(&partial)).map_err(|err| err.to_string())?;
    ensure(verdict.status() == ComplianceStatus::NonCompliant, "Q=16 must be non-compliant")?;
    let first = verdict.entries().first().ok_or("verdict has no entries")?;
    ensure(first.code == "QValueOutOfRange", &format!("unexpected first code {}", first.code))
}

// ============================================================================
// SECTION: Configured Pack
// ============================================================================

#[test]
fn configured_rows_fields_and_constraints_take_effect() -> TestResult {
    let pack = build(DOCK_DOOR).map_err(|err| err.to_string())?;
    ensure(pack.schema().contains("antenna_count"), "extra field missing")?;
    ensure(pack.constraints().tables().mode(1010).is_some(), "extra RF mode missing")?;
    let accepts_mode = pack.schema().validate_type("rf_mode", &ParamValue::Integer(1010));
    ensure(accepts_mode == Ok(true), "rf_mode domain should include the configured row")?;
    let ids: Vec<&str> =
        pack.constraints().constraints().iter().map(|constraint| constraint.id.as_str()).collect();
    ensure(ids.last() == Some(&"dock-antenna-limit"), "configured constraint should come last")?;

    let dock = pack.resolve("dock-door", None).map_err(|err| err.to_string())?;
    ensure(dock.is_complete(pack.schema()), "merged profile should be complete")?;
    let verdict = pack.evaluate(dock).map_err(|err| err.to_string())?;
    ensure(verdict.is_compliant(), &format!("dock-door should comply: {:?}", verdict.entries()))?;

    let crowded =
        dock.with_field(pack.schema(), "antenna_count", 6_i64).map_err(|err| err.to_string())?;
    let verdict = pack.evaluate_field(&crowded, "antenna_count").map_err(|err| err.to_string())?;
    let failed: Vec<&str> = verdict.failures().map(|entry| entry.id.as_str()).collect();
    ensure(failed == ["dock-antenna-limit"], &format!("unexpected failures {failed:?}"))
}

#[test]
fn configured_versions_supersede_the_builtin_profile() -> TestResult {
    let pack = build(DOCK_DOOR).map_err(|err| err.to_string())?;
    let latest =
        pack.resolve(reference::INDUSTRIAL_CONSERVATIVE, None).map_err(|err| err.to_string())?;
    ensure(latest.get(reference::Q_VALUE) == Some(&ParamValue::Integer(0)), "version 2 expected")?;
    let original = pack
        .resolve(reference::INDUSTRIAL_CONSERVATIVE, Some(ProfileVersion::new(1)))
        .map_err(|err| err.to_string())?;
    ensure(original.get(reference::Q_VALUE) == Some(&ParamValue::Integer(1)), "version 1 kept")?;
    ensure(original.get("antenna_count") == Some(&ParamValue::Integer(2)), "defaults merged")
}

#[test]
fn duplicate_profile_versions_fail_the_build() -> TestResult {
    let content = "[[profiles]]\nname = \"industrial-conservative\"\nversion = 1\n";
    match build(content) {
        Err(ConfigError::Registry(RegistryError::VersionConflict {
            version, ..
        })) if version == ProfileVersion::new(1) => Ok(()),
        other => Err(format!("unexpected result {:?}", other.map(|_| ()))),
    }
}

#[test]
fn constraints_on_unknown_fields_fail_the_build() -> TestResult {
    let content = r#"
[[constraints]]
id = "antenna-gain"
severity = "warning"
code = "AntennaGainHigh"
rationale = "gain above 6 dBi needs a site survey"
rule = { check = { kind = "compare", field = "antenna_gain", comparator = "less_than_or_equal", value = 6 } }
"#;
    match build(content) {
        Err(ConfigError::Constraint(ConstraintError::UnknownFieldReference {
            field, ..
        })) if field.as_str() == "antenna_gain" => Ok(()),
        other => Err(format!("unexpected result {:?}", other.map(|_| ()))),
    }
}

#[test]
fn duplicate_table_rows_fail_the_build() -> TestResult {
    let content = r#"
[[regions]]
region = "FCC"
max_power_dbm = 36.0
band_low_mhz = 902.0
band_high_mhz = 928.0
"#;
    match build(content) {
        Err(ConfigError::Constraint(ConstraintError::InvalidReferenceTable(reason))) => {
            ensure(reason.contains("FCC"), &reason)
        }
        other => Err(format!("unexpected result {:?}", other.map(|_| ()))),
    }
}

#[test]
fn profiles_with_unknown_fields_fail_the_build() -> TestResult {
    let content = "[[profiles]]\nname = \"lab\"\nversion = 1\nvalues = { antenna_gain = 6 }\n";
    match build(content) {
        Err(ConfigError::Invalid(message)) if message.contains("antenna_gain") => Ok(()),
        other => Err(format!("unexpected result {:?}", other.map(|_| ()))),
    }
}

#[test]
fn custom_schema_without_reference_table() -> TestResult {
    let content = r#"
[reference]
enabled = false

[[fields]]
name = "q_value"
semantic_type = "integer"
domain = { kind = "interval", min = 0, max = 15 }
default = 4

[[constraints]]
id = "q-even"
severity = "warning"
code = "QValueOdd"
rationale = "site policy prefers even Q values"
rule = { any = [{ check = { kind = "one_of", field = "q_value", values = [0, 2, 4, 6, 8, 10, 12, 14] } }] }
"#;
    let pack = build(content).map_err(|err| err.to_string())?;
    ensure(pack.schema().len() == 1, "only the configured field should exist")?;
    ensure(pack.registry().is_empty(), "no built-in profile without the reference table")?;
    let odd = Profile::from_values([("q_value", 5_i64)]);
    let verdict = pack.evaluate(&odd).map_err(|err| err.to_string())?;
    ensure(verdict.is_compliant(), "warnings never flip the status")?;
    ensure(verdict.warnings().count() == 1, "odd Q should warn once")?;
    let rule = &pack.constraints().constraints()[0].rule;
    ensure(matches!(rule, Rule::Any(_)), "rule should keep its configured shape")
}

// ============================================================================
// SECTION: Audit and Sharing
// ============================================================================

#[test]
fn file_audit_records_setup_and_evaluations() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let audit_path = dir.path().join("audit.jsonl");
    let content = format!(
        "[engine]\naudit = \"file\"\naudit_path = {:?}\n",
        audit_path.to_string_lossy()
    );
    let config_path = dir.path().join("rfid-compliance.toml");
    fs::write(&config_path, content).map_err(|err| err.to_string())?;

    let config = ComplianceConfig::load(Some(&config_path)).map_err(|err| err.to_string())?;
    let pack = config.build().map_err(|err| err.to_string())?;
    pack.evaluate(pack.default_profile()).map_err(|err| err.to_string())?;

    let log = fs::read_to_string(&audit_path).map_err(|err| err.to_string())?;
    let records: Vec<serde_json::Value> = log
        .lines()
        .map(|line| serde_json::from_str(line).map_err(|err| err.to_string()))
        .collect::<Result<_, _>>()?;
    ensure(records.len() == 2, &format!("expected two records, got {}", records.len()))?;
    ensure(records[0]["event"] == "compliance_setup", "setup event should come first")?;
    ensure(records[0]["constraints"] == 11, "setup counts constraints")?;
    ensure(records[0]["profiles"] == 1, "setup counts profiles")?;
    let source = records[0]["source"].as_str().unwrap_or_default();
    ensure(source.ends_with("rfid-compliance.toml"), "setup records the config path")?;
    ensure(records[1]["event"] == "compliance_evaluation", "evaluation event expected")
}

#[test]
fn packs_are_shared_across_threads() -> TestResult {
    let pack = CompliancePack::builtin().map_err(|err| err.to_string())?;
    let statuses: Vec<Result<ComplianceStatus, String>> = thread::scope(|scope| {
        let handles: Vec<_> = (0_i64 .. 4)
            .map(|q| {
                let pack = pack.clone();
                scope.spawn(move || {
                    let partial = Profile::from_values([(reference::Q_VALUE, q * 6)]);
                    pack.evaluate(&pack.complete(&partial))
                        .map(|verdict| verdict.status())
                        .map_err(|err| err.to_string())
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|_| Err("evaluator panicked".to_string())))
            .collect()
    });
    let statuses = statuses.into_iter().collect::<Result<Vec<_>, _>>()?;
    ensure(
        statuses
            == [
                ComplianceStatus::Compliant,
                ComplianceStatus::Compliant,
                ComplianceStatus::Compliant,
                ComplianceStatus::NonCompliant,
            ],
        &format!("unexpected statuses {statuses:?}"),
    )
}
