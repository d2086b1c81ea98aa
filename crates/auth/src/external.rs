//! Boundary to an external identity source.

use async_trait::async_trait;

use rolegate_core::Username;

use crate::AuthError;

/// Identity vouched for by the external source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub username: Username,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalOutcome {
    Accept(ExternalIdentity),
    Reject,
}

/// Checks credentials against something outside this service.
///
/// Implementations must not create local state. `Err` is reserved for the
/// source being unreachable; a wrong password is `Ok(Reject)`.
#[async_trait]
pub trait ExternalAuthenticator: Send + Sync {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<ExternalOutcome, AuthError>;
}

/// Stand-in identity source: accepts any syntactically valid username and
/// ignores the password.
///
/// This is the seam where a real directory/SSO check plugs in.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubExternalAuthenticator;

#[async_trait]
impl ExternalAuthenticator for StubExternalAuthenticator {
    async fn authenticate(
        &self,
        username: &str,
        _password: &str,
    ) -> Result<ExternalOutcome, AuthError> {
        Ok(match Username::parse(username) {
            Ok(username) => ExternalOutcome::Accept(ExternalIdentity { username }),
            Err(_) => ExternalOutcome::Reject,
        })
    }
}
