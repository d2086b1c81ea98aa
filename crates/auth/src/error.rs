//! Authentication error types.

use thiserror::Error;

use crate::{RepositoryError, TokenError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Credentials were rejected. Deliberately says nothing about whether the
    /// username exists.
    #[error("invalid credentials")]
    Denied,

    #[error("user not found")]
    NotFound,

    #[error("account is inactive")]
    Inactive,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("identity provider unavailable: {0}")]
    Upstream(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<RepositoryError> for AuthError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => AuthError::NotFound,
            other => AuthError::Storage(other.to_string()),
        }
    }
}

impl AuthError {
    /// True when the failure is the caller's (bad credentials, bad token,
    /// unknown or inactive account) rather than the service's.
    pub fn is_client_error(&self) -> bool {
        match self {
            AuthError::Denied | AuthError::NotFound | AuthError::Inactive => true,
            AuthError::Token(e) => !e.is_server_error(),
            AuthError::Upstream(_) | AuthError::Storage(_) => false,
        }
    }
}
