//! Login and manage commands.
//!
//! Both run a browser handshake; they differ only in the page mode.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::{cancel_on_ctrl_c, default_account, runtime};
use crate::cli::output;
use crate::core::api::{HttpProbe, LivenessProbe};
use crate::core::config::Config;
use crate::core::handshake::{HandshakeOptions, Mode, NoBrowser, SetupServer};
use crate::core::store::default_backend;
use crate::error::{ConfigError, Result};

/// Add one account through the browser.
pub fn login(timeout: Option<u64>, no_browser: bool) -> Result<()> {
    run(Mode::Login, timeout, no_browser)
}

/// Add, list and remove accounts through the browser.
pub fn manage(timeout: Option<u64>, no_browser: bool) -> Result<()> {
    run(Mode::Manage, timeout, no_browser)
}

fn run(mode: Mode, timeout: Option<u64>, no_browser: bool) -> Result<()> {
    let config = Config::load()?;
    let probe: Arc<dyn LivenessProbe> = Arc::new(HttpProbe::from_config(&config)?);
    let store = default_backend()?;
    let options = options_for(&config, timeout)?;

    let mut server = SetupServer::bind_with_mode(store, probe, mode)?
        .with_options(options)
        .with_default_account(&default_account());
    if no_browser {
        server = server.with_browser(NoBrowser);
    }

    let url = server.url();
    info!(mode = mode.as_str(), port = server.local_addr().port(), "starting browser setup");
    output::header("Finish setup in your browser");
    output::hint(&format!("if it did not open, visit {}", output::url(&url)));
    output::dimmed("press Ctrl-C to cancel");

    let result = runtime()?.block_on(async move {
        let cancel = cancel_on_ctrl_c();
        server.start(cancel).await
    })?;

    output::success(&format!("saved credentials for {}", result.account_name));
    Ok(())
}

fn options_for(config: &Config, timeout: Option<u64>) -> Result<HandshakeOptions> {
    let mut options = HandshakeOptions::from(&config.handshake);
    if let Some(secs) = timeout {
        if secs == 0 {
            return Err(ConfigError::Invalid {
                field: "timeout",
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }
        options.timeout = Duration::from_secs(secs);
    }
    Ok(options)
}
