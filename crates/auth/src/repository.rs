//! Storage contract for user records.
//!
//! Implementations live outside this crate (see `rolegate-infra`). The only
//! hard requirement is that `create` enforces username uniqueness atomically
//! and reports a clash as [`RepositoryError::UniqueViolation`].

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use rolegate_core::{UserId, Username};

use crate::{NewUser, User};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("user not found")]
    NotFound,

    /// A uniqueness constraint rejected the write (e.g. duplicate username).
    #[error("unique constraint violated on {0}")]
    UniqueViolation(&'static str),

    /// Storage is unreachable or failed in a way the caller cannot fix.
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &Username) -> Result<User, RepositoryError>;

    async fn find_by_id(&self, id: UserId) -> Result<User, RepositoryError>;

    /// Persist a new user, assigning its id and initial role.
    async fn create(&self, new_user: NewUser) -> Result<User, RepositoryError>;

    /// Write back the mutable fields of an existing user.
    ///
    /// `id` selects the record; `username` and `date_joined` are never
    /// rewritten.
    async fn update(&self, user: User) -> Result<User, RepositoryError>;

    async fn delete(&self, id: UserId) -> Result<(), RepositoryError>;

    /// All users, ordered by id ascending.
    async fn list(&self) -> Result<Vec<User>, RepositoryError>;
}

#[async_trait]
impl<R> UserRepository for Arc<R>
where
    R: UserRepository + ?Sized,
{
    async fn find_by_username(&self, username: &Username) -> Result<User, RepositoryError> {
        (**self).find_by_username(username).await
    }

    async fn find_by_id(&self, id: UserId) -> Result<User, RepositoryError> {
        (**self).find_by_id(id).await
    }

    async fn create(&self, new_user: NewUser) -> Result<User, RepositoryError> {
        (**self).create(new_user).await
    }

    async fn update(&self, user: User) -> Result<User, RepositoryError> {
        (**self).update(user).await
    }

    async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        (**self).delete(id).await
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        (**self).list().await
    }
}
