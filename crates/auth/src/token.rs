//! JWT issuance and verification (HS256).

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use uuid::Uuid;

use crate::claims::{validate_claims, JwtClaims, TokenError, TokenType};
use crate::User;

/// Token lifetimes and issuer name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    pub issuer: String,
    /// Access token lifetime in seconds (default: 300 = 5 minutes).
    pub access_ttl_secs: i64,
    /// Refresh token lifetime in seconds (default: 86_400 = 1 day).
    pub refresh_ttl_secs: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            issuer: "rolegate".into(),
            access_ttl_secs: 300,
            refresh_ttl_secs: 86_400,
        }
    }
}

/// Access + refresh token pair returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Verifies bearer tokens presented on requests.
pub trait JwtValidator: Send + Sync {
    /// Decode and validate an *access* token at time `now`.
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError>;
}

/// Mints and verifies HS256 tokens with a shared secret.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    config: TokenConfig,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], config: TokenConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            config,
        }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Issue a token pair for `user`, snapshotting its username and role.
    pub fn issue(&self, user: &User) -> Result<TokenPair, TokenError> {
        self.issue_at(user, Utc::now())
    }

    pub fn issue_at(&self, user: &User, now: DateTime<Utc>) -> Result<TokenPair, TokenError> {
        let access = self.claims_for(user, TokenType::Access, now)?;
        let refresh = self.claims_for(user, TokenType::Refresh, now)?;
        Ok(TokenPair {
            access: self.encode(&access)?,
            refresh: self.encode(&refresh)?,
        })
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// Identity claims are copied from the refresh token as-is, so the role
    /// stays whatever it was when the pair was issued.
    pub fn refresh(&self, refresh_token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let refresh = self.verify(refresh_token, TokenType::Refresh, now)?;
        self.access_from_refresh(refresh, now)
    }

    /// Mint an access token from already verified refresh claims.
    pub fn access_from_refresh(
        &self,
        refresh: JwtClaims,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let access = JwtClaims {
            token_type: TokenType::Access,
            iat: now.timestamp(),
            exp: expiry(now, self.config.access_ttl_secs)?,
            jti: Uuid::new_v4().to_string(),
            ..refresh
        };
        self.encode(&access)
    }

    /// Decode `token`, check its signature, issuer, type and time window.
    pub fn verify(
        &self,
        token: &str,
        expected: TokenType,
        now: DateTime<Utc>,
    ) -> Result<JwtClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by `validate_claims` against the caller's clock.
        validation.validate_exp = false;
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        let claims = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Malformed(e.to_string()))?;

        if claims.token_type != expected {
            return Err(TokenError::WrongType {
                expected,
                found: claims.token_type,
            });
        }
        validate_claims(&claims, now)?;
        Ok(claims)
    }

    fn claims_for(
        &self,
        user: &User,
        token_type: TokenType,
        now: DateTime<Utc>,
    ) -> Result<JwtClaims, TokenError> {
        let ttl = match token_type {
            TokenType::Access => self.config.access_ttl_secs,
            TokenType::Refresh => self.config.refresh_ttl_secs,
        };
        Ok(JwtClaims {
            sub: user.id.to_string(),
            username: user.username.as_str().to_string(),
            role: user.role,
            token_type,
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            exp: expiry(now, ttl)?,
            jti: Uuid::new_v4().to_string(),
        })
    }

    fn encode(&self, claims: &JwtClaims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

fn expiry(now: DateTime<Utc>, ttl_secs: i64) -> Result<i64, TokenError> {
    now.timestamp()
        .checked_add(ttl_secs)
        .ok_or_else(|| TokenError::Signing(format!("token lifetime of {ttl_secs}s overflows")))
}

impl JwtValidator for TokenIssuer {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        self.verify(token, TokenType::Access, now)
    }
}
