//! Service wiring: repository selection, auth backend strategy, token
//! issuer and the bootstrap superuser.

use std::sync::Arc;

use anyhow::Context;

use rolegate_auth::{
    provision_superuser, AuthBackend, AuthService, AutoProvisioningBackend, LocalPasswordBackend,
    StubExternalAuthenticator, TokenIssuer, UserDirectory, UserRepository,
};
use rolegate_infra::{AppConfig, AuthBackendKind, InMemoryUserRepository};

/// Shared application services, injected into handlers as an extension.
pub struct AppServices {
    pub auth: AuthService,
    pub directory: UserDirectory<Arc<dyn UserRepository>>,
}

impl AppServices {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        backend: AuthBackendKind,
        issuer: TokenIssuer,
    ) -> Self {
        let backend: Arc<dyn AuthBackend> = match backend {
            AuthBackendKind::External => Arc::new(AutoProvisioningBackend::new(
                repo.clone(),
                StubExternalAuthenticator,
            )),
            AuthBackendKind::Local => Arc::new(LocalPasswordBackend::new(repo.clone())),
        };

        Self {
            auth: AuthService::new(backend, Arc::new(issuer)),
            directory: UserDirectory::new(repo),
        }
    }
}

/// Build services from configuration.
///
/// Uses Postgres when `DATABASE_URL` is set and the `postgres` feature is
/// enabled; otherwise an in-memory repository.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let repo = build_repository(config).await?;

    if let Some(root) = &config.root {
        let user = provision_superuser(&*repo, &root.username, &root.password)
            .await
            .context("failed to provision bootstrap superuser")?;
        tracing::info!(user_id = %user.id, username = %user.username, role = %user.role, "bootstrap superuser ready");
    }

    let issuer = TokenIssuer::new(config.jwt_secret.as_bytes(), config.token.clone());
    tracing::info!(backend = ?config.auth_backend, "authentication backend selected");
    Ok(AppServices::new(repo, config.auth_backend, issuer))
}

#[cfg(feature = "postgres")]
async fn build_repository(config: &AppConfig) -> anyhow::Result<Arc<dyn UserRepository>> {
    match &config.database_url {
        Some(url) => {
            let repo = rolegate_infra::PostgresUserRepository::connect(url)
                .await
                .context("failed to connect to postgres")?;
            tracing::info!("using postgres user repository");
            Ok(Arc::new(repo))
        }
        None => {
            tracing::info!("DATABASE_URL not set; using in-memory user repository");
            Ok(Arc::new(InMemoryUserRepository::new()))
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn build_repository(config: &AppConfig) -> anyhow::Result<Arc<dyn UserRepository>> {
    if config.database_url.is_some() {
        tracing::warn!("DATABASE_URL is set but postgres support is not compiled in; using in-memory user repository");
    } else {
        tracing::info!("using in-memory user repository");
    }
    Ok(Arc::new(InMemoryUserRepository::new()))
}
