//! Login name value object.

use serde::{Deserialize, Serialize};

use crate::{DomainError, ValueObject};

/// Maximum username length, in characters.
pub const MAX_USERNAME_LEN: usize = 150;

/// A syntactically valid, case-sensitive login name.
///
/// Allowed characters are letters, digits and `@ . + - _`. Length is
/// `1..=150` characters. No normalization is applied: `Alice` and `alice` are
/// different usernames.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    pub fn parse(raw: impl Into<String>) -> Result<Self, DomainError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(DomainError::validation("username cannot be empty"));
        }
        if raw.chars().count() > MAX_USERNAME_LEN {
            return Err(DomainError::validation(format!(
                "username longer than {MAX_USERNAME_LEN} characters"
            )));
        }
        if let Some(bad) = raw.chars().find(|c| !is_username_char(*c)) {
            return Err(DomainError::validation(format!(
                "username contains invalid character {bad:?}"
            )));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

impl ValueObject for Username {}

impl core::fmt::Display for Username {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
