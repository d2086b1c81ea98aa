use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use rolegate_auth::AuthService;

use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub auth: AuthService,
}

/// Resolve the bearer token (if any) into a [`PrincipalContext`].
///
/// Never rejects. A missing or unusable token, or one naming an unknown or
/// inactive user, leaves the context anonymous.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let context = match extract_bearer(req.headers()) {
        Some(token) => match state.auth.resolve_principal(token, Utc::now()).await {
            Ok(principal) => PrincipalContext::authenticated(principal),
            Err(e) => {
                tracing::debug!(error = %e, "bearer token did not resolve to a principal");
                PrincipalContext::anonymous()
            }
        },
        None => PrincipalContext::anonymous(),
    };

    req.extensions_mut().insert(context);
    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}
