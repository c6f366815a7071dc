//! Credential commands.
//!
//! Browser flows (login, manage) and terminal flows (add, list, rm, check).

mod add;
mod check;
mod list;
mod rm;
mod session;

pub use add::execute as add;
pub use check::execute as check;
pub use list::execute as list;
pub use rm::execute as rm;
pub use session::{login, manage};

use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::constants::DEFAULT_ACCOUNT;
use crate::core::validation::{normalize_account_name, validate_account_name};
use crate::error::Result;

/// Runtime for commands that talk to the network.
fn runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(Into::into)
}

/// Token that fires on Ctrl-C. Must be called inside the runtime.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("interrupt received");
            trigger.cancel();
        }
    });
    token
}

/// The OS user name when it is a usable account name, else `default`.
fn default_account() -> String {
    let name = normalize_account_name(&whoami::username());
    if validate_account_name(&name).is_ok() {
        name
    } else {
        DEFAULT_ACCOUNT.to_string()
    }
}

/// Normalize an explicit name, or fall back to [`default_account`].
fn resolve_account(name: Option<&str>) -> Result<String> {
    let name = match name {
        Some(n) => normalize_account_name(n),
        None => default_account(),
    };
    validate_account_name(&name)?;
    Ok(name)
}
