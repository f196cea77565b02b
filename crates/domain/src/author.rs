//! Author identity — the opaque writer id attached to every record.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const SESSION_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SESSION_SUFFIX_LEN: usize = 9;

/// Opaque writer identity, such as a wallet public key or a session id.
///
/// No uniqueness or verification is enforced; the only invariant is that
/// the id is not blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AuthorId(String);

impl AuthorId {
    /// Wrap an identity string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyAuthor`] when `id` is blank.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::EmptyAuthor);
        }
        Ok(Self(id))
    }

    /// Generate an anonymous session identity of the form `user_xxxxxxxxx`.
    #[must_use]
    pub fn session() -> Self {
        Self(format!("user_{}", base36_suffix(uuid::Uuid::new_v4().as_u128())))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated display form: `abcd...wxyz` for ids longer than 8 chars.
    #[must_use]
    pub fn short(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 8 {
            return self.0.clone();
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    }
}

/// Lowest [`SESSION_SUFFIX_LEN`] base-36 digits of `n`, least significant first.
///
/// The low bits of a v4 uuid are random; version and variant bits sit higher.
fn base36_suffix(mut n: u128) -> String {
    let radix = SESSION_ALPHABET.len() as u128;
    (0..SESSION_SUFFIX_LEN)
        .map(|_| {
            let digit = usize::try_from(n % radix).unwrap_or_default();
            n /= radix;
            char::from(SESSION_ALPHABET[digit])
        })
        .collect()
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AuthorId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AuthorId> for String {
    fn from(value: AuthorId) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_reject_blank_author() {
        assert_eq!(AuthorId::new("  "), Err(ValidationError::EmptyAuthor));
        assert_eq!(AuthorId::new(""), Err(ValidationError::EmptyAuthor));
    }

    #[test]
    fn should_abbreviate_long_wallet_key() {
        let author = AuthorId::new("9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin").unwrap();
        assert_eq!(author.short(), "9xQe...VFin");
    }

    #[test]
    fn should_keep_short_ids_unchanged() {
        let author = AuthorId::new("u1").unwrap();
        assert_eq!(author.short(), "u1");
    }

    #[test]
    fn should_generate_session_id_with_user_prefix() {
        let author = AuthorId::session();
        let suffix = author.as_str().strip_prefix("user_").unwrap();
        assert_eq!(suffix.len(), 9);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
    }

    #[test]
    fn should_encode_suffix_in_base36() {
        assert_eq!(base36_suffix(0), "000000000");
        assert_eq!(base36_suffix(35), "z00000000");
        assert_eq!(base36_suffix(36 + 10), "a10000000");
        // Digits above the suffix length are ignored.
        assert_eq!(base36_suffix(36_u128.pow(9)), "000000000");
    }

    #[test]
    fn should_generate_distinct_session_ids() {
        assert_ne!(AuthorId::session(), AuthorId::session());
    }
}
