//! Token endpoints.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    routing::post,
    Json, Router,
};
use chrono::Utc;

use rolegate_auth::TokenPair;

use crate::app::dto::{TokenObtainRequest, TokenRefreshRequest, TokenRefreshResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(obtain_token))
        .route("/refresh", post(refresh_token))
}

/// POST /api/token - exchange credentials for an access/refresh pair.
pub async fn obtain_token(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<TokenObtainRequest>, JsonRejection>,
) -> Result<Json<TokenPair>, ApiError> {
    let Json(body) = body?;
    let pair = services
        .auth
        .login(&body.username, &body.password, Utc::now())
        .await?;
    Ok(Json(pair))
}

/// POST /api/token/refresh - mint a new access token from a refresh token.
pub async fn refresh_token(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<TokenRefreshRequest>, JsonRejection>,
) -> Result<Json<TokenRefreshResponse>, ApiError> {
    let Json(body) = body?;
    let access = services.auth.refresh(&body.refresh, Utc::now()).await?;
    Ok(Json(TokenRefreshResponse { access }))
}
