//! Check command - probe a stored token against the API.

use super::{resolve_account, runtime};
use crate::cli::output;
use crate::core::api::{HttpProbe, LivenessProbe};
use crate::core::config::Config;
use crate::core::store::default_backend;
use crate::error::Result;

/// Probe the stored token for `name`.
pub fn execute(name: Option<&str>) -> Result<()> {
    let name = resolve_account(name)?;
    let store = default_backend()?;
    let creds = store.get(&name)?;

    let config = Config::load()?;
    let probe = HttpProbe::from_config(&config)?;
    runtime()?.block_on(probe.check(&creds.token))?;

    output::success(&format!("{} is valid", name));
    output::kv("endpoint", probe.url());
    Ok(())
}
