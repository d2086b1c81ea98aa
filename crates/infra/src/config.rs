//! Configuration loading from environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `BIND_ADDR` | `0.0.0.0:8080` |
//! | `JWT_SECRET` | development secret (debug builds only) |
//! | `JWT_ISSUER` | `rolegate` |
//! | `ACCESS_TOKEN_TTL_SECS` | `300` |
//! | `REFRESH_TOKEN_TTL_SECS` | `86400` |
//! | `AUTH_BACKEND` | `external` |
//! | `DATABASE_URL` | unset (in-memory repository) |
//! | `ROOT_USERNAME` / `ROOT_PASSWORD` | unset (no bootstrap superuser) |

use std::net::SocketAddr;

use thiserror::Error;

use rolegate_auth::TokenConfig;

pub const DEV_JWT_SECRET: &str = "rolegate-dev-secret-change-me";

/// Upper bound for either token lifetime: ten years.
pub const MAX_TOKEN_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Which [`AuthBackend`](rolegate_auth::AuthBackend) handles logins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthBackendKind {
    /// External identity check with auto-provisioning.
    #[default]
    External,
    /// Local password verification against stored credentials.
    Local,
}

impl core::str::FromStr for AuthBackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "external" => Ok(Self::External),
            "local" => Ok(Self::Local),
            other => Err(ConfigError::Invalid {
                key: "AUTH_BACKEND",
                reason: format!("expected `external` or `local`, got `{other}`"),
            }),
        }
    }
}

/// Superuser created at startup if it does not exist yet.
#[derive(Clone, PartialEq, Eq)]
pub struct RootBootstrap {
    pub username: String,
    pub password: String,
}

impl core::fmt::Debug for RootBootstrap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RootBootstrap")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// Set when no `JWT_SECRET` was given and the development secret is used.
    pub jwt_secret_is_default: bool,
    pub token: TokenConfig,
    pub auth_backend: AuthBackendKind,
    pub database_url: Option<String>,
    pub root: Option<RootBootstrap>,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_secret_is_default", &self.jwt_secret_is_default)
            .field("token", &self.token)
            .field("auth_backend", &self.auth_backend)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("root", &self.root)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = match get("BIND_ADDR") {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::Invalid {
                key: "BIND_ADDR",
                reason: format!("{e}"),
            })?,
            None => SocketAddr::from(([0, 0, 0, 0], 8080)),
        };

        let (jwt_secret, jwt_secret_is_default) = match get("JWT_SECRET") {
            Some(secret) => (secret, false),
            None if cfg!(debug_assertions) => (DEV_JWT_SECRET.to_string(), true),
            None => return Err(ConfigError::Missing("JWT_SECRET")),
        };

        let defaults = TokenConfig::default();
        let token = TokenConfig {
            issuer: get("JWT_ISSUER").unwrap_or(defaults.issuer),
            access_ttl_secs: parse_ttl("ACCESS_TOKEN_TTL_SECS", get("ACCESS_TOKEN_TTL_SECS"))?
                .unwrap_or(defaults.access_ttl_secs),
            refresh_ttl_secs: parse_ttl("REFRESH_TOKEN_TTL_SECS", get("REFRESH_TOKEN_TTL_SECS"))?
                .unwrap_or(defaults.refresh_ttl_secs),
        };

        let auth_backend = match get("AUTH_BACKEND") {
            Some(raw) => raw.parse()?,
            None => AuthBackendKind::default(),
        };

        let root = match (get("ROOT_USERNAME"), get("ROOT_PASSWORD")) {
            (Some(username), Some(password)) => Some(RootBootstrap { username, password }),
            (Some(_), None) => return Err(ConfigError::Missing("ROOT_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Missing("ROOT_USERNAME")),
            (None, None) => None,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            jwt_secret_is_default,
            token,
            auth_backend,
            database_url: get("DATABASE_URL"),
            root,
        })
    }
}

fn parse_ttl(key: &'static str, raw: Option<String>) -> Result<Option<i64>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.trim().parse::<i64>() {
        Ok(secs) if secs > MAX_TOKEN_TTL_SECS => Err(ConfigError::Invalid {
            key,
            reason: format!("must be at most {MAX_TOKEN_TTL_SECS} seconds"),
        }),
        Ok(secs) if secs > 0 => Ok(Some(secs)),
        Ok(_) => Err(ConfigError::Invalid {
            key,
            reason: "must be a positive number of seconds".into(),
        }),
        Err(e) => Err(ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
    }
}
