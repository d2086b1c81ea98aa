//! User directory: gated CRUD over user records.
//!
//! Every operation runs the access gate before touching the repository.

use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use rolegate_core::{DomainError, EmailAddress, UserId, Username};

use crate::{
    authorize, AuthzError, Credential, CredentialError, NewUser, Operation, Principal,
    RepositoryError, ResourceKind, Role, User, UserRepository, UserUpdate,
};

// ─────────────────────────────────────────────────────────────────────────────
// Representation
// ─────────────────────────────────────────────────────────────────────────────

/// Public representation of a user. Has no credential field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub is_active: bool,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.to_string(),
            email: user.email.as_ref().map(|e| e.to_string()).unwrap_or_default(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
            is_active: user.is_active,
        }
    }
}

/// Administrative creation request.
///
/// There is no role field: the role comes from `is_superuser` when the
/// record is first stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserInput {
    pub username: String,
    pub password: Option<String>,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub is_superuser: bool,
    pub is_active: bool,
}

impl CreateUserInput {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: None,
            email: None,
            first_name: String::new(),
            last_name: String::new(),
            is_superuser: false,
            is_active: true,
        }
    }

    fn into_new_user(self) -> Result<NewUser, DirectoryError> {
        let username = Username::parse(self.username)?;
        let email = match self.email.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(EmailAddress::parse(raw)?),
        };
        let credential = match self.password {
            Some(password) => Credential::from_password(&password)?,
            None => Credential::Unusable,
        };
        Ok(NewUser {
            username,
            email,
            first_name: self.first_name,
            last_name: self.last_name,
            credential,
            is_superuser: self.is_superuser,
            is_active: self.is_active,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error(transparent)]
    Authz(#[from] AuthzError),

    #[error("user not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<RepositoryError> for DirectoryError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => DirectoryError::NotFound,
            RepositoryError::UniqueViolation(field) => {
                DirectoryError::Conflict(format!("a user with that {field} already exists"))
            }
            RepositoryError::Unavailable(msg) => DirectoryError::Storage(msg),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Service
// ─────────────────────────────────────────────────────────────────────────────

pub struct UserDirectory<R> {
    repo: R,
}

impl<R: UserRepository> UserDirectory<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    fn gate(principal: Option<&Principal>, operation: Operation) -> Result<(), DirectoryError> {
        authorize(principal, ResourceKind::UserDirectory, operation).map_err(|e| {
            tracing::warn!(?operation, error = %e, "user directory access denied");
            DirectoryError::from(e)
        })
    }

    /// All users, ordered by id ascending.
    pub async fn list(
        &self,
        principal: Option<&Principal>,
    ) -> Result<Vec<UserView>, DirectoryError> {
        Self::gate(principal, Operation::List)?;
        let mut users = self.repo.list().await?;
        users.sort_by_key(|u| u.id);
        Ok(users.iter().map(UserView::from).collect())
    }

    pub async fn retrieve(
        &self,
        principal: Option<&Principal>,
        id: UserId,
    ) -> Result<UserView, DirectoryError> {
        Self::gate(principal, Operation::Retrieve)?;
        let user = self.repo.find_by_id(id).await?;
        Ok(UserView::from(&user))
    }

    #[instrument(skip(self, principal, input), fields(username = %input.username))]
    pub async fn create(
        &self,
        principal: Option<&Principal>,
        input: CreateUserInput,
    ) -> Result<UserView, DirectoryError> {
        Self::gate(principal, Operation::Create)?;
        let user = self.repo.create(input.into_new_user()?).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "user created");
        Ok(UserView::from(&user))
    }

    #[instrument(skip(self, principal, update))]
    pub async fn update(
        &self,
        principal: Option<&Principal>,
        id: UserId,
        update: UserUpdate,
    ) -> Result<UserView, DirectoryError> {
        Self::gate(principal, Operation::Update)?;
        let mut user = self.repo.find_by_id(id).await?;
        user.apply_update(update);
        let user = self.repo.update(user).await?;
        tracing::info!(user_id = %user.id, role = %user.role, is_active = user.is_active, "user updated");
        Ok(UserView::from(&user))
    }

    #[instrument(skip(self, principal))]
    pub async fn delete(
        &self,
        principal: Option<&Principal>,
        id: UserId,
    ) -> Result<(), DirectoryError> {
        Self::gate(principal, Operation::Delete)?;
        self.repo.delete(id).await?;
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }
}

/// Create a superuser outside the HTTP surface (bootstrap / operator path).
///
/// Idempotent: if the username is already taken, the existing record is
/// returned untouched, including its current role.
pub async fn provision_superuser<R>(
    repo: &R,
    username: &str,
    password: &str,
) -> Result<User, DirectoryError>
where
    R: UserRepository + ?Sized,
{
    let username = Username::parse(username)?;
    match repo.find_by_username(&username).await {
        Ok(existing) => {
            tracing::info!(user_id = %existing.id, "superuser already present");
            return Ok(existing);
        }
        Err(RepositoryError::NotFound) => {}
        Err(e) => return Err(e.into()),
    }

    let new_user = NewUser {
        credential: Credential::from_password(password)?,
        is_superuser: true,
        ..NewUser::external(username.clone())
    };
    match repo.create(new_user).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, role = %user.role, "superuser provisioned");
            Ok(user)
        }
        Err(RepositoryError::UniqueViolation(_)) => Ok(repo.find_by_username(&username).await?),
        Err(e) => Err(e.into()),
    }
}
