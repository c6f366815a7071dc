//! Tests for `roster auth rm`.

use crate::support::*;

#[test]
fn test_rm_account() {
    let t = Test::with_accounts(STANDARD_ACCOUNTS);

    let output = t.rm("personal");
    assert_success(&output);
    assert_stdout_contains(&output, "removed personal");

    let output = t.list();
    assert_stdout_contains(&output, "work");
    assert!(!stdout(&output).contains("personal"));
}

#[test]
fn test_rm_missing_account() {
    let t = Test::new();

    let output = t.rm("ghost");
    assert_failure(&output);
    assert_stderr_contains(&output, "account not found: ghost");
    assert_stdout_contains(&output, "roster auth login");
}

#[test]
fn test_rm_without_terminal_skips_prompt() {
    let t = Test::with_accounts(STANDARD_ACCOUNTS);

    // stdin is not a terminal under the test harness
    let output = t.cmd().args(["auth", "rm", "work"]).output().unwrap();
    assert_success(&output);
}
