//! Input validation for roster operations.
//!
//! Sanitizes and validates account names and bearer tokens. Used by both the
//! terminal flow (`auth add`) and the browser handshake, so nothing here
//! assumes where the input came from.

use crate::core::constants::{MAX_ACCOUNT_NAME_LEN, MAX_TOKEN_LEN};
use crate::error::{Result, ValidationError};

/// Strip control characters from a raw token.
///
/// Removes every ASCII control character (0x00-0x1F and 0x7F) anywhere in
/// the string, then trims leading and trailing ASCII whitespace. Interior
/// spaces survive. Total and idempotent.
///
/// # Example
///
/// ```
/// use roster::core::validation::sanitize_token;
///
/// assert_eq!(sanitize_token("  \x00hello\x7F world\t\n"), "hello world");
/// ```
pub fn sanitize_token(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|c| !c.is_ascii_control()).collect();
    stripped.trim_matches(is_trim_char).to_string()
}

/// Byte-level variant of [`sanitize_token`] for input that may not be UTF-8.
///
/// Control bytes never occur inside a multi-byte UTF-8 sequence, so any other
/// byte is passed through untouched.
pub fn sanitize_token_bytes(raw: &[u8]) -> Vec<u8> {
    let stripped: Vec<u8> = raw
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_control())
        .collect();

    let start = stripped
        .iter()
        .position(|b| !is_trim_char(*b as char))
        .unwrap_or(stripped.len());
    let end = stripped
        .iter()
        .rposition(|b| !is_trim_char(*b as char))
        .map_or(start, |i| i + 1);

    stripped[start..end].to_vec()
}

fn is_trim_char(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Normalize an account name the way callers do before validating it.
///
/// Trims surrounding whitespace and lower-cases ASCII letters.
pub fn normalize_account_name(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

/// Validate an account name.
///
/// Account names must be 1-64 characters of `A-Z`, `a-z`, `0-9`, `_` or `-`.
/// No normalization happens here.
///
/// # Errors
///
/// Returns `ValidationError::InvalidAccountName` if the name is empty, too
/// long, or contains any other byte.
pub fn validate_account_name(name: &str) -> Result<()> {
    let invalid = |reason: String| -> Result<()> {
        Err(ValidationError::InvalidAccountName {
            name: name.to_string(),
            reason,
        }
        .into())
    };

    if name.is_empty() {
        return invalid("cannot be empty".to_string());
    }

    if name.len() > MAX_ACCOUNT_NAME_LEN {
        return invalid(format!(
            "longer than {} characters",
            MAX_ACCOUNT_NAME_LEN
        ));
    }

    if let Some(i) = name
        .bytes()
        .position(|b| !(b.is_ascii_alphanumeric() || b == b'_' || b == b'-'))
    {
        return invalid(format!(
            "invalid character at position {}. Only A-Z, a-z, 0-9, '_' and '-' are allowed",
            i + 1
        ));
    }

    Ok(())
}

/// Validate a (sanitized) token.
///
/// Only rejects obviously wrong input; the API owns the token format.
///
/// # Errors
///
/// Returns `ValidationError::InvalidToken` if the token is empty or longer
/// than 4096 bytes.
pub fn validate_token(token: &str) -> Result<()> {
    if token.is_empty() {
        return Err(ValidationError::InvalidToken("cannot be empty".to_string()).into());
    }

    if token.len() > MAX_TOKEN_LEN {
        return Err(ValidationError::InvalidToken(format!(
            "longer than {} bytes",
            MAX_TOKEN_LEN
        ))
        .into());
    }

    Ok(())
}
