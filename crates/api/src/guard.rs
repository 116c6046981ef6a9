//! Authorization guards layered after [`crate::middleware::protect`].
//!
//! Each guard reads the resolved [`Session`] out of request extensions; a
//! missing session is an authentication failure (the route forgot `protect`,
//! or the caller bypassed it), never a silent pass.

use std::future::Future;
use std::pin::Pin;

use axum::{extract::Request, middleware::Next, response::Response};

use millworks_auth::{check_permission, check_role, AuthError, Session};

use crate::app::errors;

type GuardFuture = Pin<Box<dyn Future<Output = Response> + Send>>;

/// Require one permission, matched against the session's resolved set by name
/// or identity. Denials carry the permission name in the message.
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(Request, Next) -> GuardFuture + Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let Some(session) = req.extensions().get::<Session>() else {
                return errors::auth_error_to_response(AuthError::Unauthenticated);
            };

            if let Err(err) = check_permission(&session.permissions, permission) {
                tracing::warn!(
                    user_id = %session.user.id,
                    role = %session.role_name(),
                    required_permission = permission,
                    "permission denied"
                );
                return errors::auth_error_to_response(err);
            }

            next.run(req).await
        })
    }
}

/// Require the session's resolved role name to be one of `allowed`.
pub fn require_role(
    allowed: &'static [&'static str],
) -> impl Fn(Request, Next) -> GuardFuture + Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let Some(session) = req.extensions().get::<Session>() else {
                return errors::auth_error_to_response(AuthError::Unauthenticated);
            };

            if let Err(err) = check_role(session.role_name(), allowed) {
                tracing::warn!(
                    user_id = %session.user.id,
                    role = %session.role_name(),
                    allowed_roles = ?allowed,
                    "role denied"
                );
                return errors::auth_error_to_response(err);
            }

            next.run(req).await
        })
    }
}
