use axum::{routing::get, Router};

pub mod auth;
pub mod system;
pub mod users;

/// Router for all endpoints that see a resolved principal.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/users", users::router())
}
