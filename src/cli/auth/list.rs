//! List command.

use crate::cli::output;
use crate::core::store::default_backend;
use crate::error::Result;

/// List stored accounts. Tokens are always masked.
pub fn execute(json: bool) -> Result<()> {
    let store = default_backend()?;
    let accounts = store.list()?;

    if json {
        let accounts_json: Vec<_> = accounts
            .iter()
            .map(|c| {
                serde_json::json!({
                    "name": c.name,
                    "created_at": c.created_at.to_rfc3339(),
                    "masked": c.token.masked(),
                })
            })
            .collect();

        let result = serde_json::json!({
            "accounts": accounts_json,
            "count": accounts.len()
        });
        output::data(&serde_json::to_string_pretty(&result)?);
    } else if accounts.is_empty() {
        output::dimmed("no accounts stored");
        output::hint("run: roster auth login");
    } else {
        output::blank();
        output::header(&format!("{} accounts", output::count(accounts.len())));
        output::rule();
        for creds in &accounts {
            output::kv(
                &creds.name,
                format!(
                    "{}  {}",
                    creds.token.masked(),
                    creds.created_at.format("%Y-%m-%d %H:%M")
                ),
            );
        }
    }

    Ok(())
}
