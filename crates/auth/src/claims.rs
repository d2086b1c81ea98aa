use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rolegate_core::UserId;

use crate::Role;

/// Which half of a token pair a JWT is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

impl core::fmt::Display for TokenType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TokenType::Access => f.write_str("access"),
            TokenType::Refresh => f.write_str("refresh"),
        }
    }
}

/// JWT claims carried by every rolegate token.
///
/// `username` and `role` are copies taken at issuance. They are not refreshed
/// when the user record changes: a token keeps the role it was minted with
/// until it expires or a new pair is issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject: the user id, as a decimal string.
    pub sub: String,

    pub username: String,

    pub role: Role,

    pub token_type: TokenType,

    /// Issuer.
    pub iss: String,

    /// Issued-at (Unix seconds).
    pub iat: i64,

    /// Expiration (Unix seconds).
    pub exp: i64,

    /// Unique token id.
    pub jti: String,
}

impl JwtClaims {
    pub fn user_id(&self) -> Result<UserId, TokenError> {
        self.sub
            .parse::<UserId>()
            .map_err(|e| TokenError::Malformed(format!("subject: {e}")))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("expected {expected} token, got {found}")]
    WrongType { expected: TokenType, found: TokenType },

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token signing failed: {0}")]
    Signing(String),
}

impl TokenError {
    pub fn is_server_error(&self) -> bool {
        matches!(self, TokenError::Signing(_))
    }
}

/// Deterministically validate the time window of a token.
///
/// Signature checks happen during decoding; this only looks at `iat`/`exp`
/// against the supplied clock.
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenError::Expired);
    }
    Ok(())
}
