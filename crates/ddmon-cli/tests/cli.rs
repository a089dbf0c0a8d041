//! Binary-level tests for the `ddmon` executable.
//!
//! Every invocation points at an unroutable API root, so these only cover
//! paths that fail or finish before the first request.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CREDENTIAL_VARS: [&str; 5] = [
    "DD_API_KEY",
    "DATADOG_API_KEY",
    "DD_APP_KEY",
    "DATADOG_APP_KEY",
    "DD_API_URL",
];

fn ddmon() -> Command {
    let mut cmd = Command::cargo_bin("ddmon").expect("binary should build");
    for var in CREDENTIAL_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn ddmon_with_keys() -> Command {
    let mut cmd = ddmon();
    cmd.args([
        "--api-key",
        "test-api",
        "--app-key",
        "test-app",
        "--api-url",
        "http://127.0.0.1:9",
    ]);
    cmd
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_help_succeeds() {
    ddmon()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("delete-all"))
        .stdout(predicate::str::contains("add-tags"));
}

#[test]
fn test_missing_credentials_fail_before_any_request() {
    ddmon()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: configuration error"))
        .stderr(predicate::str::contains("DD_API_KEY"));
}

#[test]
fn test_credentials_from_environment_are_accepted() {
    // Fails on the validation step, not on configuration.
    ddmon()
        .env("DATADOG_API_KEY", "k")
        .env("DATADOG_APP_KEY", "a")
        .args(["delete", "--monitor-id", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--confirm"))
        .stderr(predicate::str::contains("configuration error").not());
}

#[test]
fn test_short_variable_names_are_accepted() {
    ddmon()
        .env("DD_API_KEY", "k")
        .env("DD_APP_KEY", "a")
        .env("DD_API_URL", "http://127.0.0.1:9")
        .args(["delete", "--monitor-id", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--confirm"))
        .stderr(predicate::str::contains("configuration error").not());
}

#[test]
fn test_blank_short_variable_falls_back_to_long_name() {
    ddmon()
        .env("DD_API_KEY", " ")
        .env("DATADOG_API_KEY", "k")
        .env("DD_APP_KEY", "a")
        .args(["delete", "--monitor-id", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--confirm"))
        .stderr(predicate::str::contains("configuration error").not());
}

// ============================================================================
// Argument validation
// ============================================================================

#[test]
fn test_delete_without_confirm_is_refused() {
    ddmon_with_keys()
        .args(["delete", "--monitor-id", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("please use --confirm to confirm deletion"));
}

#[test]
fn test_query_with_service_is_rejected() {
    ddmon_with_keys()
        .args([
            "add-tags",
            "--query",
            "service:(a OR b)",
            "--service",
            "a",
            "--tag",
            "team:core",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot use --query together"));
}

#[test]
fn test_add_tags_without_target_is_rejected() {
    ddmon_with_keys()
        .args(["add-tags", "--tag", "team:core"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("either --monitor-id or filter flags"));
}

#[test]
fn test_add_tags_requires_a_tag() {
    ddmon_with_keys()
        .args(["add-tags", "--monitor-id", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--tag"));
}

#[test]
fn test_delete_all_json_requires_yes() {
    ddmon_with_keys()
        .args(["--format", "json", "delete-all", "--service", "a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes is required with --format json"));
}

// ============================================================================
// Templates
// ============================================================================

#[test]
fn test_template_invalid_environment() {
    ddmon_with_keys()
        .args([
            "template",
            "--service",
            "checkout",
            "--env",
            "staging",
            "--namespace",
            "shop",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "invalid environment: staging (must be dev, hml, prd, or corp)",
        ));
}

#[test]
fn test_template_missing_default_directory() {
    let dir = TempDir::new().expect("tempdir");
    ddmon_with_keys()
        .current_dir(dir.path())
        .args([
            "template",
            "--service",
            "checkout",
            "--env",
            "hml",
            "--namespace",
            "shop",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("template directory not found"));
}

#[test]
fn test_template_malformed_file() {
    let dir = TempDir::new().expect("tempdir");
    let file = dir.path().join("broken.json");
    std::fs::write(&file, "[1, 2]").expect("write");

    ddmon_with_keys()
        .args([
            "template",
            "--service",
            "checkout",
            "--env",
            "hml",
            "--namespace",
            "shop",
            "--file",
        ])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("template document must be a JSON object"));
}
