//! Tests of the `h41-harvester` binary on saved release pages.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("h41")
        .join(name)
}

fn harvester() -> Command {
    let mut cmd = Command::cargo_bin("h41-harvester").unwrap();
    // Keep the environment from changing reconciliation behavior.
    cmd.env_remove("H41_ZERO_TOTALS_FATAL")
        .env_remove("H41_RECONCILE_TOLERANCE");
    cmd
}

#[test]
fn test_parse_valid_release_prints_json() {
    harvester()
        .arg("parse")
        .arg(fixture("20260108.html"))
        .args(["--date", "2026-01-08"])
        .args(["--source-url", "https://www.federalreserve.gov/releases/h41/20260108/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"reportDate\": \"2026-01-08\""))
        .stdout(predicate::str::contains("\"weekEnded\": \"2026-01-07\""))
        .stdout(predicate::str::contains("\"diagnostics\": null"));
}

#[test]
fn test_parse_writes_yaml_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("report.yaml");

    harvester()
        .arg("parse")
        .arg(fixture("20260108.html"))
        .args(["--date", "2026-01-08", "--format", "yaml", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved to:"));

    let yaml = std::fs::read_to_string(&output).unwrap();
    assert!(yaml.contains("reportDate: 2026-01-08") || yaml.contains("reportDate: '2026-01-08'"));
    assert!(yaml.contains("reserveBalances: 2773191.0"));
}

#[test]
fn test_parse_zero_totals_exits_with_not_ok() {
    harvester()
        .arg("parse")
        .arg(fixture("zero_totals.html"))
        .args(["--date", "2026-01-08"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("reconciliation failure"));
}

#[test]
fn test_parse_drift_emits_outcome_without_report() {
    harvester()
        .arg("parse")
        .arg(fixture("drift.html"))
        .args(["--date", "2026-01-08"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("\"report\": null"))
        .stdout(predicate::str::contains("structural drift [factors]"));
}

#[test]
fn test_invalid_date_is_an_error() {
    harvester()
        .arg("parse")
        .arg(fixture("20260108.html"))
        .args(["--date", "08-01-2026"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid date"));
}

#[test]
fn test_missing_file_is_an_error() {
    harvester()
        .arg("parse")
        .arg(fixture("does_not_exist.html"))
        .args(["--date", "2026-01-08"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("IO error"));
}
