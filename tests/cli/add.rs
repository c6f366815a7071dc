//! Tests for `roster auth add`.

use crate::support::*;

#[test]
fn test_add_from_stdin() {
    let t = Test::new();

    let output = t.add("work", "rst_live_work_token_1234");
    assert_success(&output);
    assert_stdout_contains(&output, "saved credentials for work");
    assert_output_excludes(&output, "rst_live_work_token_1234");
    assert!(t.credentials_path().exists());
}

#[test]
fn test_add_normalizes_name() {
    let t = Test::new();

    let output = t.add("  Work ", "rst_live_work_token_1234");
    assert_success(&output);

    let output = t.list();
    assert_stdout_contains(&output, "work");
}

#[test]
fn test_add_sanitizes_piped_token() {
    let t = Test::new();

    let output = t.add("work", "\u{1b}rst_live_work_token_1234 \r\n");
    assert_success(&output);

    let raw = std::fs::read_to_string(t.credentials_path()).unwrap();
    assert!(raw.contains("\"rst_live_work_token_1234\""));
}

#[test]
fn test_add_rejects_invalid_name() {
    let t = Test::new();

    let output = t.add("no spaces allowed", "rst_live_work_token_1234");
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid account name");
    assert!(!t.credentials_path().exists());
}

#[test]
fn test_add_rejects_empty_token() {
    let t = Test::new();

    let output = t.add("work", " \n");
    assert_failure(&output);
    assert_stderr_contains(&output, "invalid token");
}

#[test]
fn test_add_rejects_invalid_utf8() {
    let t = Test::new();

    let output = t
        .cmd()
        .args(["auth", "add", "work", "--token-stdin", "--skip-check"])
        .write_stdin(vec![0xffu8, 0xfe, b'a'])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "not valid UTF-8");
}

#[test]
fn test_add_overwrites_existing() {
    let t = Test::with_accounts(&[("work", "rst_live_old_token_0000")]);

    let output = t.add("work", "rst_live_new_token_9999");
    assert_success(&output);

    let raw = std::fs::read_to_string(t.credentials_path()).unwrap();
    assert!(raw.contains("rst_live_new_token_9999"));
    assert!(!raw.contains("rst_live_old_token_0000"));
}

#[test]
fn test_add_checked_accepts_valid_token() {
    let api = FakeApi::start();
    let t = Test::with_api(api.url());

    let output = t.add_checked("work", VALID_TOKEN);
    assert_success(&output);
    assert_eq!(api.probes(), 1);
}

#[test]
fn test_add_checked_rejects_revoked_token() {
    let api = FakeApi::start();
    let t = Test::with_api(api.url());

    let output = t.add_checked("work", REVOKED_TOKEN);
    assert_failure(&output);
    assert_stderr_contains(&output, "token rejected");
    assert!(!t.credentials_path().exists());
}

#[test]
fn test_add_checked_needs_api_url() {
    let t = Test::new();

    let output = t.add_checked("work", VALID_TOKEN);
    assert_failure(&output);
    assert_stderr_contains(&output, "no API url configured");
    assert_stdout_contains(&output, "ROSTER_API_URL");
}

#[cfg(unix)]
#[test]
fn test_credentials_file_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let t = Test::with_accounts(&[("work", "rst_live_work_token_1234")]);

    let mode = std::fs::metadata(t.credentials_path())
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);
}
