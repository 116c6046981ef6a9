use axum::{http::StatusCode, response::IntoResponse, Extension, Json};

use millworks_auth::Session;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Identity probe behind the `optional` middleware: authenticated callers get
/// their resolved identity, anonymous callers a marker instead of a 401.
pub async fn whoami(session: Option<Extension<Session>>) -> impl IntoResponse {
    match session {
        Some(Extension(session)) => Json(serde_json::json!({
            "authenticated": true,
            "user_id": session.user.id.to_string(),
            "email": session.user.email,
            "role": session.role_name(),
            "permissions": session
                .permissions
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>(),
        })),
        None => Json(serde_json::json!({ "authenticated": false })),
    }
}
