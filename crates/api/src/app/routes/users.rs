//! User directory endpoints. ROOT only.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use rolegate_auth::{DirectoryError, Operation, UserUpdate, UserView};
use rolegate_core::UserId;

use crate::app::dto::{CreateUserRequest, UpdateUserRequest};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::PrincipalContext;

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/:id",
            get(get_user)
                .patch(update_user)
                .put(update_user)
                .delete(delete_user),
        )
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/users - all users ordered by id.
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Json<Vec<UserView>>, ApiError> {
    let users = services.directory.list(principal.principal()).await?;
    Ok(Json(users))
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Json<UserView>, ApiError> {
    let id = parse_id(&principal, &id, Operation::Retrieve)?;
    let user = services.directory.retrieve(principal.principal(), id).await?;
    Ok(Json(user))
}

/// POST /api/users - create a user; the role comes from `is_superuser`.
pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserView>), ApiError> {
    authz::authorize_directory(&principal, Operation::Create)?;
    let Json(body) = body?;
    let user = services
        .directory
        .create(principal.principal(), body.into())
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// PATCH|PUT /api/users/:id - partial update. Never re-derives the role.
pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserView>, ApiError> {
    let id = parse_id(&principal, &id, Operation::Update)?;
    let Json(body) = body?;
    let update = UserUpdate::try_from(body).map_err(DirectoryError::from)?;
    let user = services
        .directory
        .update(principal.principal(), id, update)
        .await?;
    Ok(Json(user))
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&principal, &id, Operation::Delete)?;
    services.directory.delete(principal.principal(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Parse a path id. Callers without access get the gate's answer rather
/// than a 404.
fn parse_id(
    principal: &PrincipalContext,
    raw: &str,
    operation: Operation,
) -> Result<UserId, ApiError> {
    authz::authorize_directory(principal, operation)?;
    raw.parse().map_err(|_| ApiError::NotFound)
}
