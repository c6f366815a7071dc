//! Tests for `roster auth list`.

use crate::support::*;

#[test]
fn test_list_empty() {
    let t = Test::new();

    let output = t.list();
    assert_success(&output);
    assert_stdout_contains(&output, "no accounts stored");
}

#[test]
fn test_list_masks_tokens() {
    let t = Test::with_accounts(STANDARD_ACCOUNTS);

    let output = t.list();
    assert_success(&output);
    assert_stdout_contains(&output, "work");
    assert_stdout_contains(&output, "personal");
    assert_stdout_contains(&output, "1234");
    for (_, token) in STANDARD_ACCOUNTS {
        assert_output_excludes(&output, token);
    }
}

#[test]
fn test_list_json() {
    let t = Test::with_accounts(STANDARD_ACCOUNTS);

    let output = t.list_json();
    assert_success(&output);

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["count"], 2);
    let accounts = json["accounts"].as_array().unwrap();
    assert_eq!(accounts[0]["name"], "personal");
    assert_eq!(accounts[1]["name"], "work");
    assert!(accounts[1]["masked"].as_str().unwrap().ends_with("1234"));
    assert!(accounts[1].get("token").is_none());
}
