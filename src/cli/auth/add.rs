//! Add command.
//!
//! Store a token typed at a hidden prompt or piped on stdin.

use std::io::{self, IsTerminal, Read};

use dialoguer::Password;
use tracing::info;
use zeroize::Zeroizing;

use super::{resolve_account, runtime};
use crate::cli::output;
use crate::core::api::{HttpProbe, LivenessProbe};
use crate::core::config::Config;
use crate::core::domain::{Credentials, Token};
use crate::core::store::default_backend;
use crate::core::validation::{sanitize_token_bytes, validate_token};
use crate::error::{Result, ValidationError};

/// Add an account from the terminal.
pub fn execute(name: Option<&str>, token_stdin: bool, skip_check: bool) -> Result<()> {
    let name = resolve_account(name)?;

    let raw = if token_stdin || !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(Vec::new());
        io::stdin().read_to_end(&mut buf)?;
        buf
    } else {
        let typed = Zeroizing::new(
            Password::new()
                .with_prompt(format!("Token for {}", name))
                .interact()?,
        );
        Zeroizing::new(typed.as_bytes().to_vec())
    };

    let token = token_from_bytes(&raw)?;
    info!(account = %name, fingerprint = %token.fingerprint(), "adding account");

    if skip_check {
        output::warn("skipping API check");
    } else {
        let config = Config::load()?;
        let probe = HttpProbe::from_config(&config)?;
        runtime()?.block_on(probe.check(&token))?;
    }

    let store = default_backend()?;
    store.set(&name, &Credentials::new(name.clone(), token))?;

    output::success(&format!("saved credentials for {}", name));
    Ok(())
}

/// Sanitize raw input bytes into a validated token.
fn token_from_bytes(raw: &[u8]) -> Result<Token> {
    let cleaned = sanitize_token_bytes(raw);
    let text = String::from_utf8(cleaned)
        .map_err(|_| ValidationError::InvalidToken("not valid UTF-8".to_string()))?;
    validate_token(&text)?;
    Ok(Token::new(text))
}
