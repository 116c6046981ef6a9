//! Consistent error responses.
//!
//! Validation and authorization failures are mapped at the point of
//! detection; only unexpected store failures reach the generic 500 arm, and
//! those never leak internal detail to the caller.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use millworks_auth::AuthError;

pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    match &err {
        AuthError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        AuthError::DuplicateKey { field } => json_error(
            StatusCode::BAD_REQUEST,
            "duplicate_key",
            format!("duplicate value for field '{field}'"),
        ),
        AuthError::InvalidReference(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_reference", msg)
        }
        AuthError::InvalidCredentials
        | AuthError::AccountDeactivated
        | AuthError::AccountLocked
        | AuthError::InvalidToken
        | AuthError::SessionInvalid
        | AuthError::RoleMissing
        | AuthError::RoleNotFound
        | AuthError::Unauthenticated => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", err.to_string())
        }
        AuthError::Forbidden(msg) => json_error(StatusCode::FORBIDDEN, "forbidden", msg),
        AuthError::Conflict(msg) => json_error(StatusCode::BAD_REQUEST, "conflict", msg),
        AuthError::Store(detail) => {
            tracing::error!(error = %detail, "store failure while handling request");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "an internal error occurred",
            )
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
