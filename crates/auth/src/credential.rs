//! Local password credential, hashed with Argon2id.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use std::sync::OnceLock;

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use thiserror::Error;

/// Storage marker for an account without a usable local password.
///
/// PHC hash strings always start with `$`, so the two never collide.
pub const UNUSABLE_MARKER: &str = "!";

/// Hashed once, verified against when there is no real hash to check, so a
/// failed login costs the same whether or not the account exists.
static DUMMY: OnceLock<Credential> = OnceLock::new();

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("password cannot be empty")]
    EmptyPassword,

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Argon2id hash in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_phc(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Local login credential of a user.
///
/// `Unusable` is a permanent, valid state for externally authenticated
/// accounts: local password login always fails for them. It is not the same
/// as a hash of the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Usable(PasswordHash),
    Unusable,
}

impl Credential {
    /// Hash `password` into a usable credential.
    pub fn from_password(password: &str) -> Result<Self, CredentialError> {
        if password.is_empty() {
            return Err(CredentialError::EmptyPassword);
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?;
        Ok(Credential::Usable(PasswordHash(hash.to_string())))
    }

    pub fn is_usable(&self) -> bool {
        matches!(self, Credential::Usable(_))
    }

    /// Check `password` against this credential.
    ///
    /// Always `false` for `Unusable`. A malformed stored hash also yields
    /// `false` (and a warning) rather than an error: the account simply
    /// cannot log in locally.
    pub fn verify(&self, password: &str) -> bool {
        let Credential::Usable(hash) = self else {
            return false;
        };
        let parsed = match argon2::PasswordHash::new(hash.as_phc()) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("stored password hash is malformed: {e}");
                return false;
            }
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Run a full verification against a fixed throwaway hash.
    ///
    /// Always `false`.
    pub fn verify_dummy(password: &str) -> bool {
        let _ = std::hint::black_box(Self::dummy().verify(password));
        false
    }

    fn dummy() -> &'static Credential {
        DUMMY.get_or_init(|| {
            Credential::from_password("rolegate-dummy-password").unwrap_or_else(|e| {
                tracing::warn!("dummy credential could not be hashed: {e}");
                Credential::Unusable
            })
        })
    }

    /// Encode for a single text column.
    pub fn to_storage(&self) -> String {
        match self {
            Credential::Usable(hash) => hash.as_phc().to_string(),
            Credential::Unusable => UNUSABLE_MARKER.to_string(),
        }
    }

    /// Decode a value written by [`Credential::to_storage`].
    ///
    /// Anything that does not look like a PHC string is treated as unusable.
    pub fn from_storage(raw: &str) -> Self {
        if raw.starts_with('$') {
            Credential::Usable(PasswordHash::from_phc(raw))
        } else {
            Credential::Unusable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_matches() {
        let credential = Credential::from_password("hunter2").unwrap();
        assert!(credential.is_usable());
        assert!(credential.verify("hunter2"));
    }

    #[test]
    fn wrong_password_does_not_match() {
        let credential = Credential::from_password("hunter2").unwrap();
        assert!(!credential.verify("hunter3"));
    }

    #[test]
    fn unusable_never_verifies() {
        let credential = Credential::Unusable;
        assert!(!credential.is_usable());
        for attempt in ["", "!", "x", "hunter2"] {
            assert!(!credential.verify(attempt));
        }
    }

    #[test]
    fn dummy_credential_is_a_real_hash() {
        let dummy = Credential::dummy();
        assert!(dummy.is_usable());
        assert!(std::ptr::eq(dummy, Credential::dummy()));
        assert!(dummy.verify("rolegate-dummy-password"));
    }

    #[test]
    fn dummy_verification_never_succeeds() {
        for attempt in ["", "hunter2", "rolegate-dummy-password"] {
            assert!(!Credential::verify_dummy(attempt));
        }
    }

    #[test]
    fn empty_password_is_rejected_at_hashing() {
        assert_eq!(Credential::from_password(""), Err(CredentialError::EmptyPassword));
    }

    #[test]
    fn malformed_hash_is_not_usable_for_login() {
        let credential = Credential::Usable(PasswordHash::from_phc("$not-a-phc"));
        assert!(!credential.verify("anything"));
    }

    #[test]
    fn storage_encoding_keeps_sentinel_distinct() {
        assert_eq!(Credential::Unusable.to_storage(), UNUSABLE_MARKER);
        assert_eq!(Credential::from_storage(UNUSABLE_MARKER), Credential::Unusable);
        assert_eq!(Credential::from_storage(""), Credential::Unusable);

        let usable = Credential::from_password("pw").unwrap();
        let restored = Credential::from_storage(&usable.to_storage());
        assert!(restored.verify("pw"));
    }

    #[test]
    fn debug_output_hides_hash() {
        let credential = Credential::from_password("pw").unwrap();
        let debug = format!("{credential:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("argon2"));
    }
}
