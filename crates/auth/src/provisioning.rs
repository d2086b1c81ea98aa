//! Authentication backed by an external identity source, with local
//! auto-provisioning on first login.
//!
//! The external source is trusted on every login, not just the first one:
//! an existing local user is returned as-is without re-checking any local
//! password.

use async_trait::async_trait;
use tracing::instrument;

use rolegate_core::{UserId, Username};

use crate::{
    AuthBackend, AuthError, ExternalAuthenticator, ExternalOutcome, NewUser, RepositoryError,
    User, UserRepository,
};

pub struct AutoProvisioningBackend<R, E> {
    repo: R,
    external: E,
}

impl<R, E> AutoProvisioningBackend<R, E>
where
    R: UserRepository,
    E: ExternalAuthenticator,
{
    pub fn new(repo: R, external: E) -> Self {
        Self { repo, external }
    }

    /// Find the local record for `username`, creating it if this is the
    /// first time we see it.
    ///
    /// At most one record is ever created per username: if a concurrent login
    /// wins the insert, the uniqueness violation is swallowed and the winner's
    /// record is returned instead.
    async fn find_or_provision(&self, username: &Username) -> Result<User, AuthError> {
        match self.repo.find_by_username(username).await {
            Ok(user) => return Ok(user),
            Err(RepositoryError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }

        match self.repo.create(NewUser::external(username.clone())).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, username = %user.username, role = %user.role, "provisioned user on first login");
                Ok(user)
            }
            Err(RepositoryError::UniqueViolation(_)) => {
                tracing::warn!(%username, "concurrent first login; using the record created by the other request");
                Ok(self.repo.find_by_username(username).await?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl<R, E> AuthBackend for AutoProvisioningBackend<R, E>
where
    R: UserRepository,
    E: ExternalAuthenticator,
{
    #[instrument(skip(self, password), fields(backend = "external"))]
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let identity = match self.external.authenticate(username, password).await? {
            ExternalOutcome::Accept(identity) => identity,
            ExternalOutcome::Reject => {
                tracing::warn!("external authentication rejected");
                return Err(AuthError::Denied);
            }
        };

        let user = self.find_or_provision(&identity.username).await?;
        if !user.is_active {
            tracing::warn!(user_id = %user.id, "login attempt for inactive account");
            return Err(AuthError::Denied);
        }
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<User, AuthError> {
        Ok(self.repo.find_by_id(id).await?)
    }
}
