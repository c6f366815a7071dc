//! Roster - command-line client for the Roster workforce-management API.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use roster::cli::output;
use roster::cli::{execute, Cli};
use roster::core::constants::LOG_ENV;
use roster::error::{ConfigError, Error, HandshakeError, StoreError};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("roster=debug")
        } else {
            EnvFilter::new("roster=warn")
        }
    });

    // Logs go to stderr so piped output stays clean.
    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    if let Err(e) = execute(cli.command) {
        if e.is_cancellation() {
            output::dimmed(&e.to_string());
            return;
        }

        let suggestion = match &e {
            Error::Config(ConfigError::MissingApiUrl) => {
                Some("set ROSTER_API_URL or api.url in ~/.roster/config.toml")
            }
            Error::Store(StoreError::NotFound(_)) => Some("run: roster auth login"),
            Error::Store(StoreError::NoHome) => Some("set ROSTER_HOME to a writable directory"),
            Error::Handshake(HandshakeError::Bind(_)) => {
                Some("try: roster auth add --token-stdin")
            }
            Error::Handshake(HandshakeError::TooManyAttempts(_)) => {
                Some("check the token, then run: roster auth login")
            }
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
