//! Tests for `roster auth check`.

use crate::support::*;

#[test]
fn test_check_valid_token() {
    let api = FakeApi::start();
    let t = Test::with_api(api.url());
    assert_success(&t.add("work", VALID_TOKEN));

    let output = t.check("work");
    assert_success(&output);
    assert_stdout_contains(&output, "work is valid");
    assert_output_excludes(&output, VALID_TOKEN);
    assert_eq!(api.probes(), 1);
}

#[test]
fn test_check_revoked_token() {
    let api = FakeApi::start();
    let t = Test::with_api(api.url());
    assert_success(&t.add("work", REVOKED_TOKEN));

    let output = t.check("work");
    assert_failure(&output);
    assert_stderr_contains(&output, "HTTP 401");
}

#[test]
fn test_check_unknown_account() {
    let api = FakeApi::start();
    let t = Test::with_api(api.url());

    let output = t.check("ghost");
    assert_failure(&output);
    assert_stderr_contains(&output, "account not found");
    assert_eq!(api.probes(), 0);
}

#[test]
fn test_check_uses_config_file() {
    let api = FakeApi::start();
    let t = Test::new();
    std::fs::write(
        t.config_path(),
        format!("[api]\nurl = \"{}\"\nprobe_path = \"{}\"\n", api.url(), PROBE_PATH),
    )
    .unwrap();
    assert_success(&t.add("work", VALID_TOKEN));

    let output = t.check("work");
    assert_success(&output);
}

#[test]
fn test_check_server_error() {
    let api = FakeApi::start();
    let t = Test::new();
    std::fs::write(
        t.config_path(),
        format!("[api]\nurl = \"{}\"\nprobe_path = \"/broken\"\n", api.url()),
    )
    .unwrap();
    assert_success(&t.add("work", VALID_TOKEN));

    let output = t.check("work");
    assert_failure(&output);
    assert_stderr_contains(&output, "HTTP 500");
}
