//! End-to-end CLI tests for the cookiesync binary.
//!
//! Only exercises paths that exit before any browser launch.

use assert_cmd::Command;
use predicates::prelude::*;

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("cookiesync").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Refresh the staging session cookie"));
}

/// The --env-key help text warns that the override also renames the CI
/// output line.
#[test]
fn test_binary_help_notes_env_key_ci_coupling() {
    let mut cmd = Command::cargo_bin("cookiesync").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("CI output"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("cookiesync").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cookiesync"));
}

/// Test that invalid flags cause non-zero exit.
#[test]
fn test_binary_invalid_flag_returns_error() {
    let mut cmd = Command::cargo_bin("cookiesync").unwrap();
    cmd.arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

/// Test that an unknown mode value is rejected by clap.
#[test]
fn test_binary_unknown_mode_returns_error() {
    let mut cmd = Command::cargo_bin("cookiesync").unwrap();
    cmd.args(["--mode", "automatic"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

/// An unparseable login URL fails fast (exit code 1) before any browser
/// is launched.
#[test]
fn test_binary_invalid_login_url_exits_nonzero() {
    let mut cmd = Command::cargo_bin("cookiesync").unwrap();
    cmd.args(["--login-url", "not-a-url"])
        .assert()
        .failure()
        .code(1);
}
