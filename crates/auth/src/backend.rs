//! Authentication backend strategy.

use async_trait::async_trait;

use rolegate_core::UserId;

use crate::{AuthError, Principal, User};

/// Pluggable authentication strategy injected into the login flow.
///
/// `authenticate` turns credentials into a local user; `get_user` is the
/// per-request lookup used when resolving a token back to a principal.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError>;

    async fn get_user(&self, id: UserId) -> Result<User, AuthError>;

    /// Resolve a principal for an already verified subject id.
    ///
    /// Inactive accounts do not resolve.
    async fn resolve_principal(&self, id: UserId) -> Result<Principal, AuthError> {
        let user = self.get_user(id).await?;
        if !user.is_active {
            return Err(AuthError::Inactive);
        }
        Ok(Principal::from_user(&user))
    }
}
