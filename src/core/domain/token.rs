//! Token type.
//!
//! Wraps a bearer token with zeroize-on-drop memory and a redacted `Debug`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Characters of the token shown by [`Token::masked`].
const VISIBLE_SUFFIX: usize = 4;

/// Tokens shorter than this are fully masked.
const MIN_MASKABLE_LEN: usize = 12;

/// An opaque bearer secret.
///
/// Never printed whole: use [`Token::masked`] or [`Token::fingerprint`] for
/// display and [`Token::expose`] only where the raw value is sent.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(Zeroizing<String>);

impl Token {
    /// Wrap an already sanitized and validated token.
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Raw token value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Display form: the last four characters behind a mask.
    ///
    /// Short tokens are masked entirely.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() < MIN_MASKABLE_LEN {
            return "••••".to_string();
        }
        let suffix: String = chars[chars.len() - VISIBLE_SUFFIX..].iter().collect();
        format!("••••{}", suffix)
    }

    /// Short SHA-256 fingerprint, safe for logs.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        digest
            .iter()
            .take(6)
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token(<redacted>)")
    }
}

impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Token::new)
    }
}
