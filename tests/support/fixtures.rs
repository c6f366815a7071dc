//! Test fixtures and constants.

/// Token the fake API accepts.
pub const VALID_TOKEN: &str = "rst_live_9f8e7d6c5b4a3210";

/// Well-formed token the fake API refuses.
pub const REVOKED_TOKEN: &str = "rst_live_revoked_000000";

/// Path the fake API answers probes on.
pub const PROBE_PATH: &str = "/v1/me";

/// Accounts used across list/rm tests.
pub const STANDARD_ACCOUNTS: &[(&str, &str)] = &[
    ("work", "rst_live_work_token_1234"),
    ("personal", "rst_live_personal_5678"),
];
