//! Tests for error handling and CLI flags.

use predicates::prelude::*;

use crate::support::*;

#[test]
fn test_help_lists_auth() {
    let t = Test::new();

    t.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("auth"));
}

#[test]
fn test_auth_help_lists_subcommands() {
    let t = Test::new();

    t.cmd()
        .args(["auth", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("manage"))
        .stdout(predicate::str::contains("add"));
}

#[test]
fn test_unknown_command_fails() {
    let t = Test::new();

    let output = t.cmd().arg("unknown-command").output().unwrap();
    assert_failure(&output);
}

#[test]
fn test_version_flag() {
    let t = Test::new();

    t.cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("roster"));
}

#[test]
fn test_completions_bash_outputs_script() {
    let t = Test::new();

    t.cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("roster"));
}

#[test]
fn test_login_without_api_url_fails_with_hint() {
    let t = Test::new();

    let output = t
        .cmd()
        .args(["auth", "login", "--no-browser"])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "no API url configured");
    assert_stdout_contains(&output, "ROSTER_API_URL");
}

#[test]
fn test_login_rejects_zero_timeout() {
    let t = Test::with_api("http://127.0.0.1:9");

    let output = t
        .cmd()
        .args(["auth", "login", "--no-browser", "--timeout", "0"])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "timeout");
}

#[test]
fn test_login_timeout_is_clean_exit() {
    let t = Test::with_api("http://127.0.0.1:9");

    let output = t
        .cmd()
        .args(["auth", "login", "--no-browser", "--timeout", "1"])
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "http://127.0.0.1:");
    assert_stdout_contains(&output, "setup timed out");
    assert!(!t.credentials_path().exists());
}

#[test]
fn test_corrupt_config_fails() {
    let t = Test::new();
    std::fs::write(t.config_path(), "[api\nurl = ").unwrap();

    let output = t
        .cmd()
        .args(["auth", "login", "--no-browser"])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "failed to parse config");
}
