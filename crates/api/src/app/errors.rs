use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use rolegate_auth::{AuthError, AuthzError, CredentialError, DirectoryError, TokenError};

/// Every error the HTTP layer can return, rendered as
/// `{"error": <code>, "message": <text>}`.
#[derive(Debug)]
pub enum ApiError {
    /// Login rejected. Never says why.
    AuthenticationFailed,
    /// A token presented for exchange was not acceptable.
    InvalidToken(TokenError),
    Authz(AuthzError),
    Directory(DirectoryError),
    BadRequest { status: StatusCode, message: String },
    NotFound,
    Internal(String),
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        ApiError::Authz(err)
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Authz(e) => ApiError::Authz(e),
            other => ApiError::Directory(other),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Token(e) if !e.is_server_error() => ApiError::InvalidToken(e),
            e if e.is_client_error() => ApiError::AuthenticationFailed,
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<axum::extract::rejection::JsonRejection> for ApiError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        ApiError::BadRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::AuthenticationFailed => unauthorized(json_error(
                StatusCode::UNAUTHORIZED,
                "authentication_failed",
                "no active account found with the given credentials",
            )),
            ApiError::InvalidToken(e) => unauthorized(json_error(
                StatusCode::UNAUTHORIZED,
                "token_not_valid",
                e.to_string(),
            )),
            ApiError::Authz(e @ AuthzError::Unauthenticated) => unauthorized(json_error(
                StatusCode::UNAUTHORIZED,
                "not_authenticated",
                e.to_string(),
            )),
            ApiError::Authz(e @ AuthzError::Forbidden { .. }) => {
                json_error(StatusCode::FORBIDDEN, "permission_denied", e.to_string())
            }
            ApiError::Directory(e) => directory_error_to_response(e),
            ApiError::BadRequest { status, message } => {
                json_error(status, "invalid_request", message)
            }
            ApiError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
            ApiError::Internal(msg) => internal(msg),
        }
    }
}

fn directory_error_to_response(err: DirectoryError) -> Response {
    match err {
        DirectoryError::Authz(e) => ApiError::Authz(e).into_response(),
        DirectoryError::NotFound => {
            json_error(StatusCode::NOT_FOUND, "not_found", "user not found")
        }
        DirectoryError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DirectoryError::Validation(e) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string())
        }
        DirectoryError::Credential(e @ CredentialError::EmptyPassword) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string())
        }
        DirectoryError::Credential(e) => internal(e.to_string()),
        DirectoryError::Storage(msg) => internal(msg),
    }
}

fn internal(msg: String) -> Response {
    tracing::error!(error = %msg, "request failed");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "internal server error",
    )
}

fn unauthorized(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    response
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
