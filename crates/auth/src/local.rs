//! Authentication against locally stored password hashes.

use async_trait::async_trait;
use tracing::instrument;

use rolegate_core::{UserId, Username};

use crate::{AuthBackend, AuthError, Credential, RepositoryError, User, UserRepository};

/// Looks the user up locally and verifies the stored credential.
///
/// Never creates users. Accounts with an unusable credential (externally
/// provisioned ones) can never log in through this backend.
pub struct LocalPasswordBackend<R> {
    repo: R,
}

impl<R: UserRepository> LocalPasswordBackend<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl<R: UserRepository> AuthBackend for LocalPasswordBackend<R> {
    #[instrument(skip(self, password), fields(backend = "local"))]
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let Ok(username) = Username::parse(username) else {
            Credential::verify_dummy(password);
            return Err(AuthError::Denied);
        };

        let user = match self.repo.find_by_username(&username).await {
            Ok(user) => user,
            Err(RepositoryError::NotFound) => {
                Credential::verify_dummy(password);
                return Err(AuthError::Denied);
            }
            Err(e) => return Err(e.into()),
        };

        if !user.has_usable_password() {
            Credential::verify_dummy(password);
            tracing::warn!(user_id = %user.id, "local authentication failed");
            return Err(AuthError::Denied);
        }
        if !user.check_password(password) || !user.is_active {
            tracing::warn!(user_id = %user.id, "local authentication failed");
            return Err(AuthError::Denied);
        }
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<User, AuthError> {
        Ok(self.repo.find_by_id(id).await?)
    }
}
