//! Remove command.

use std::io::{self, IsTerminal};

use dialoguer::Confirm;

use crate::cli::output;
use crate::core::store::default_backend;
use crate::core::validation::normalize_account_name;
use crate::error::Result;

/// Remove a stored account, confirming first on a terminal.
pub fn execute(name: &str, yes: bool) -> Result<()> {
    let name = normalize_account_name(name);
    let store = default_backend()?;
    // Fails with NotFound before asking anything.
    store.get(&name)?;

    if !yes && io::stdin().is_terminal() {
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove credentials for {}?", name))
            .default(false)
            .interact()?;
        if !confirmed {
            output::dimmed("nothing removed");
            return Ok(());
        }
    }

    store.delete(&name)?;
    output::success(&format!("removed {}", name));
    Ok(())
}
