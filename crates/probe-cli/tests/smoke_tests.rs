//! Smoke tests for the booker-probe CLI
//!
//! Nothing here reaches the public booking API: runs either select no
//! scenarios or point at a closed local port.

#![allow(deprecated)] // Command::cargo_bin until assert_cmd settles its replacement
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const ENV_KEYS: [&str; 9] = [
    "BOOKER_BASE_URL",
    "APP_URL",
    "PROBE_TIMEOUT_MS",
    "PROBE_LOG_LEVEL",
    "PROBE_OUTPUT_DIR",
    "AXE_SOURCE_PATH",
    "AUTH_USERNAME",
    "AUTH_PASSWORD",
    "RUST_LOG",
];

/// Command for the booker-probe binary with a clean probe environment
fn booker_probe() -> Command {
    let mut cmd = Command::cargo_bin("booker-probe").expect("booker-probe binary should exist");
    for key in ENV_KEYS {
        cmd.env_remove(key);
    }
    cmd.env("PROBE_LOG_LEVEL", "error");
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    booker_probe()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.3.0"));
}

#[test]
fn test_help_flag() {
    booker_probe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_no_args_fails() {
    booker_probe().assert().failure();
}

#[test]
fn test_unknown_suite_rejected() {
    booker_probe()
        .args(["run", "--suite", "mobile"])
        .assert()
        .code(2);
}

// ============================================================================
// List
// ============================================================================

#[test]
fn test_list_shows_api_scenarios() {
    booker_probe()
        .args(["list", "--suite", "api"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Verify POST API Request"))
        .stdout(predicate::str::contains("Verify DELETE API Request"))
        .stdout(predicate::str::contains("Blogspot").not());
}

#[test]
fn test_list_ui_parallel_group() {
    booker_probe()
        .args(["list", "--suite", "ui", "--tag", "@parallel"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Verify Test1"))
        .stdout(predicate::str::contains("Verify Test5"))
        .stdout(predicate::str::contains("5 scenario(s)"));
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_redacts_password() {
    booker_probe()
        .env("AUTH_USERNAME", "admin")
        .env("AUTH_PASSWORD", "do-not-print-me")
        .args(["config", "--base-url", "http://localhost:3001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://localhost:3001"))
        .stdout(predicate::str::contains("admin / <redacted>"))
        .stdout(predicate::str::contains("do-not-print-me").not());
}

#[test]
fn test_config_json_names_missing_credentials() {
    let output = booker_probe()
        .args(["config", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value["credentials"]["error"]
        .as_str()
        .unwrap()
        .contains("AUTH_USERNAME"));
}

#[test]
fn test_invalid_timeout_env_is_setup_error() {
    booker_probe()
        .env("PROBE_TIMEOUT_MS", "soon")
        .arg("config")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("soon"));
}

// ============================================================================
// Run
// ============================================================================

#[test]
fn test_run_with_no_matches_passes_and_writes_reports() {
    let out = TempDir::new().unwrap();
    let output = booker_probe()
        .args(["run", "--suite", "api", "--grep", "no such scenario", "--json"])
        .arg("--output")
        .arg(out.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["total"], 0);
    assert!(out.path().join("report.json").is_file());
    assert!(out.path().join("junit.xml").is_file());
}

#[test]
fn test_run_against_closed_port_fails() {
    let out = TempDir::new().unwrap();
    booker_probe()
        .env("AUTH_USERNAME", "admin")
        .env("AUTH_PASSWORD", "password123")
        .args([
            "run",
            "--suite",
            "api",
            "--grep",
            "Verify POST API Request",
            "--base-url",
            "http://127.0.0.1:9",
            "--color",
            "never",
        ])
        .arg("--output")
        .arg(out.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("FAIL"));

    let junit = fs::read_to_string(out.path().join("junit.xml")).unwrap();
    assert!(junit.contains("<failure"));
}

#[test]
fn test_zero_jobs_is_setup_error() {
    booker_probe()
        .args(["run", "-j", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--jobs"));
}

#[cfg(not(feature = "browser"))]
#[test]
fn test_ui_suite_needs_browser_feature() {
    booker_probe()
        .args(["run", "--suite", "ui"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--features browser"));
}
