//! Infrastructure layer: user repositories and configuration loading.

pub mod config;
pub mod memory;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use config::{AppConfig, AuthBackendKind, ConfigError, RootBootstrap};
pub use memory::InMemoryUserRepository;

#[cfg(feature = "postgres")]
pub use postgres::PostgresUserRepository;
