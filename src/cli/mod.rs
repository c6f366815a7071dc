//! Command-line interface.

pub mod auth;
pub mod completions;
pub mod output;

use clap::{Parser, Subcommand};

/// Roster - command-line client for the Roster workforce-management API.
#[derive(Parser)]
#[command(
    name = "roster",
    about = "Command-line client for the Roster workforce-management API",
    version
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Manage stored API credentials
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Auth subcommands.
#[derive(Subcommand)]
pub enum AuthAction {
    /// Add an account through a local browser page
    Login {
        /// Give up after this many seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
        /// Print the url instead of opening a browser
        #[arg(long)]
        no_browser: bool,
    },

    /// Add, list and remove accounts through a local browser page
    Manage {
        /// Give up after this many seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
        /// Print the url instead of opening a browser
        #[arg(long)]
        no_browser: bool,
    },

    /// Add an account from the terminal
    Add {
        /// Account name (defaults to your user name)
        name: Option<String>,
        /// Read the token from stdin instead of prompting
        #[arg(long)]
        token_stdin: bool,
        /// Store without checking the token against the API
        #[arg(long)]
        skip_check: bool,
    },

    /// List stored accounts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove a stored account
    Rm {
        /// Account name
        name: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Check a stored token against the API
    Check {
        /// Account name (defaults to your user name)
        name: Option<String>,
    },
}

/// Execute a command.
pub fn execute(command: Command) -> crate::error::Result<()> {
    match command {
        Command::Auth { action } => match action {
            AuthAction::Login {
                timeout,
                no_browser,
            } => auth::login(timeout, no_browser),
            AuthAction::Manage {
                timeout,
                no_browser,
            } => auth::manage(timeout, no_browser),
            AuthAction::Add {
                name,
                token_stdin,
                skip_check,
            } => auth::add(name.as_deref(), token_stdin, skip_check),
            AuthAction::List { json } => auth::list(json),
            AuthAction::Rm { name, yes } => auth::rm(&name, yes),
            AuthAction::Check { name } => auth::check(name.as_deref()),
        },
        Command::Completions { shell } => completions::execute(shell),
    }
}
