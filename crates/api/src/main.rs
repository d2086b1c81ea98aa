use anyhow::Context;

use rolegate_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rolegate_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    if config.jwt_secret_is_default {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
    }
    tracing::debug!(?config, "loaded configuration");

    let app = rolegate_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
