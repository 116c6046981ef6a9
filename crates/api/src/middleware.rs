//! Authentication middleware: token extraction, verification, session
//! resolution.
//!
//! Token transport is the `Authorization: Bearer <token>` header or the
//! HTTP-only `token` cookie; the header wins when both are present.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use millworks_auth::{AuthError, Session, TokenService};

use crate::app::{errors, services::AppServices};

/// State handed to the auth middleware layers.
#[derive(Clone)]
pub struct AuthState {
    pub services: Arc<AppServices>,
}

/// Require a valid session: verify the bearer token, resolve the user's role
/// and permission set, and stash the [`Session`] in request extensions.
pub async fn protect(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    match authenticate(&state.services, req.headers()).await {
        Ok(session) => {
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        Err(err) => {
            tracing::warn!(error = %err, uri = %req.uri(), "request rejected at the gate");
            errors::auth_error_to_response(err)
        }
    }
}

/// Best-effort session resolution: any failure degrades to an anonymous
/// request instead of rejecting it. Handlers read `Option<Extension<Session>>`.
pub async fn optional(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Ok(session) = authenticate(&state.services, req.headers()).await {
        req.extensions_mut().insert(session);
    }
    next.run(req).await
}

async fn authenticate(
    services: &AppServices,
    headers: &HeaderMap,
) -> Result<Session, AuthError> {
    let token = extract_token(headers).ok_or(AuthError::Unauthenticated)?;
    let user_id = services.tokens.verify(&token)?;
    services.resolver.resolve(user_id).await
}

/// Header first, cookie second.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(header) = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        if let Some(token) = TokenService::extract_from_header(header) {
            return Some(token.to_string());
        }
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| cookie.trim().strip_prefix("token=").map(str::to_string))
        .filter(|t| !t.is_empty())
}
