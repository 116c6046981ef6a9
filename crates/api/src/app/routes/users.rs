//! Administrative user management.
//!
//! Every route sits behind `protect` plus a per-operation permission guard.
//! Self-protection: an administrator can never deactivate or delete their own
//! account through these endpoints.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, put},
    Json, Router,
};

use millworks_auth::{AuthError, RoleRef, Session, User};
use millworks_core::UserId;

use crate::app::{dto, errors, services::AppServices};
use crate::guard::require_permission;

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            get(list_users).layer(axum::middleware::from_fn(require_permission("read_user"))),
        )
        .route(
            "/:id",
            get(get_user).layer(axum::middleware::from_fn(require_permission("read_user"))),
        )
        .route(
            "/:id",
            put(update_user).layer(axum::middleware::from_fn(require_permission("update_user"))),
        )
        .route(
            "/:id",
            delete(delete_user).layer(axum::middleware::from_fn(require_permission("delete_user"))),
        )
}

/// GET /users
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.users.list().await {
        Ok(users) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "count": users.len(),
                "data": users,
            })),
        )
            .into_response(),
        Err(e) => errors::auth_error_to_response(e.into()),
    }
}

/// GET /users/:id
pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Ok(id) = id.parse::<UserId>() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id");
    };

    match services.users.find_by_id(id).await {
        Ok(Some(user)) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "data": user })),
        )
            .into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => errors::auth_error_to_response(e.into()),
    }
}

/// PUT /users/:id
pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateUserRequest>,
) -> axum::response::Response {
    let Ok(id) = id.parse::<UserId>() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id");
    };

    let user = match services.users.find_by_id(id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found")
        }
        Err(e) => return errors::auth_error_to_response(e.into()),
    };

    match apply_user_update(&services, &session, user, body).await {
        Ok(updated) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "data": updated })),
        )
            .into_response(),
        Err(err) => errors::auth_error_to_response(err),
    }
}

async fn apply_user_update(
    services: &AppServices,
    session: &Session,
    mut user: User,
    patch: dto::UpdateUserRequest,
) -> Result<User, AuthError> {
    if patch.is_active == Some(false) && session.user.id == user.id {
        return Err(AuthError::validation(
            "you cannot deactivate your own account",
        ));
    }

    if let Some(email) = patch.email {
        if email.trim().is_empty() || !email.contains('@') {
            return Err(AuthError::validation("invalid email format"));
        }
        if let Some(clash) = services.users.find_by_email(&email).await? {
            if clash.id != user.id {
                return Err(AuthError::DuplicateKey { field: "email" });
            }
        }
        user.email = email;
    }
    if let Some(employee_id) = patch.employee_id {
        if let Some(clash) = services.users.find_by_employee_id(&employee_id).await? {
            if clash.id != user.id {
                return Err(AuthError::DuplicateKey {
                    field: "employee_id",
                });
            }
        }
        user.employee_id = Some(employee_id);
    }
    if let Some(display_name) = patch.display_name {
        if display_name.trim().is_empty() {
            return Err(AuthError::validation("display name cannot be empty"));
        }
        user.display_name = display_name;
    }
    if let Some(role_id) = patch.role {
        // Validate the reference, then persist it as a pointer; the session
        // resolver re-expands it on the next request.
        let role = services.registry.get(role_id).await?;
        user.role = Some(RoleRef::Unresolved(role.id));
    }
    if let Some(is_active) = patch.is_active {
        user.is_active = is_active;
    }

    services.users.save(&user).await?;
    tracing::info!(
        actor = %session.user.id,
        user_id = %user.id,
        "user updated"
    );
    Ok(user)
}

/// DELETE /users/:id
pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Ok(id) = id.parse::<UserId>() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id");
    };

    if session.user.id == id {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "you cannot delete your own account",
        );
    }

    match services.users.find_by_id(id).await {
        Ok(Some(user)) => {
            if let Err(e) = services.users.delete(id).await {
                return errors::auth_error_to_response(e.into());
            }
            tracing::info!(
                actor = %session.user.id,
                user_id = %user.id,
                email = %user.email,
                "user deleted"
            );
            (
                StatusCode::OK,
                Json(serde_json::json!({ "success": true })),
            )
                .into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => errors::auth_error_to_response(e.into()),
    }
}
