//! Opening the user's default browser.
//!
//! Best effort only: a failure is logged and the caller prints the session
//! url so the user can navigate manually.

use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{HandshakeError, Result};

/// Opens a url in a browser.
pub trait BrowserOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}

/// The platform's default browser.
pub struct SystemBrowser;

impl BrowserOpener for SystemBrowser {
    fn open(&self, url: &str) -> Result<()> {
        let mut cmd = platform_command(url)?;
        debug!(program = ?cmd.get_program(), "opening browser");

        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| HandshakeError::Browser(e.to_string()))?;
        Ok(())
    }
}

#[cfg(target_os = "macos")]
fn platform_command(url: &str) -> Result<Command> {
    let mut cmd = Command::new("open");
    cmd.arg(url);
    Ok(cmd)
}

#[cfg(windows)]
fn platform_command(url: &str) -> Result<Command> {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", "", url]);
    Ok(cmd)
}

#[cfg(all(unix, not(target_os = "macos")))]
fn platform_command(url: &str) -> Result<Command> {
    let program = which::which("xdg-open")
        .map_err(|e| HandshakeError::Browser(format!("xdg-open not available: {}", e)))?;
    let mut cmd = Command::new(program);
    cmd.arg(url);
    Ok(cmd)
}

/// Never opens anything; the user follows the printed url.
pub struct NoBrowser;

impl BrowserOpener for NoBrowser {
    fn open(&self, _url: &str) -> Result<()> {
        debug!("browser launch disabled");
        Ok(())
    }
}
