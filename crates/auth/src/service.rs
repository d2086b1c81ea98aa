//! Login orchestration: backend → token issuer, and the reverse path from a
//! bearer token back to a principal.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{AuthBackend, AuthError, JwtValidator, Principal, TokenIssuer, TokenPair, TokenType};

/// Authentication service.
///
/// Holds the injected backend strategy and the token issuer; carries no
/// per-request state.
#[derive(Clone)]
pub struct AuthService {
    backend: Arc<dyn AuthBackend>,
    issuer: Arc<TokenIssuer>,
}

impl AuthService {
    pub fn new(backend: Arc<dyn AuthBackend>, issuer: Arc<TokenIssuer>) -> Self {
        Self { backend, issuer }
    }

    pub fn issuer(&self) -> &Arc<TokenIssuer> {
        &self.issuer
    }

    /// Authenticate and issue a token pair.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, AuthError> {
        let user = self.backend.authenticate(username, password).await?;
        let pair = self.issuer.issue_at(&user, now)?;
        tracing::info!(user_id = %user.id, role = %user.role, "issued token pair");
        Ok(pair)
    }

    /// Standard reissue: new access token from a refresh token.
    ///
    /// The user the token names must still exist and be active.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = self.issuer.verify(refresh_token, TokenType::Refresh, now)?;
        let principal = self.backend.resolve_principal(claims.user_id()?).await?;
        let access = self.issuer.access_from_refresh(claims, now)?;
        tracing::debug!(user_id = %principal.user_id, "refreshed access token");
        Ok(access)
    }

    /// Verify an access token and load the principal it names.
    ///
    /// Any failure (bad signature, expiry, unknown or inactive user) means
    /// the request is unauthenticated.
    pub async fn resolve_principal(
        &self,
        access_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Principal, AuthError> {
        let claims = self.issuer.validate(access_token, now)?;
        let user_id = claims.user_id()?;
        let principal = self.backend.resolve_principal(user_id).await?;
        tracing::debug!(user_id = %principal.user_id, role = %principal.role, "resolved principal");
        Ok(principal)
    }
}
