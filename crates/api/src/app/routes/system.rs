use axum::{extract::Extension, http::StatusCode, Json};

use rolegate_auth::AuthzError;

use crate::app::dto::WhoAmIResponse;
use crate::app::errors::ApiError;
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /api/whoami - the principal behind the bearer token.
pub async fn whoami(
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Json<WhoAmIResponse>, ApiError> {
    let principal = principal.principal().ok_or(AuthzError::Unauthenticated)?;
    Ok(Json(WhoAmIResponse::from(principal)))
}
