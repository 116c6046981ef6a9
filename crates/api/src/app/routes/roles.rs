//! Role administration.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};

use millworks_core::RoleId;
use millworks_auth::Session;

use crate::app::{dto, errors, services::AppServices};
use crate::guard::require_permission;
use millworks_infra::NewRole;

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            get(list_roles).layer(axum::middleware::from_fn(require_permission("read_role"))),
        )
        .route(
            "/",
            post(create_role).layer(axum::middleware::from_fn(require_permission("create_role"))),
        )
        .route(
            "/hierarchy",
            get(hierarchy).layer(axum::middleware::from_fn(require_permission("read_role"))),
        )
        .route(
            "/:id",
            get(get_role).layer(axum::middleware::from_fn(require_permission("read_role"))),
        )
        .route(
            "/:id",
            put(update_role).layer(axum::middleware::from_fn(require_permission("update_role"))),
        )
        .route(
            "/:id",
            delete(delete_role).layer(axum::middleware::from_fn(require_permission("delete_role"))),
        )
}

/// GET /roles
pub async fn list_roles(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.registry.list().await {
        Ok(roles) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "count": roles.len(),
                "data": roles,
            })),
        )
            .into_response(),
        Err(err) => errors::auth_error_to_response(err),
    }
}

/// GET /roles/hierarchy, highest authority first.
pub async fn hierarchy(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.registry.hierarchy().await {
        Ok(roles) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "count": roles.len(),
                "data": roles,
            })),
        )
            .into_response(),
        Err(err) => errors::auth_error_to_response(err),
    }
}

/// GET /roles/:id
pub async fn get_role(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Ok(id) = id.parse::<RoleId>() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid role id");
    };

    match services.roles.find_by_id(id).await {
        Ok(Some(role)) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "data": role })),
        )
            .into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "role not found"),
        Err(e) => errors::auth_error_to_response(e.into()),
    }
}

/// POST /roles
pub async fn create_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Session>,
    Json(body): Json<dto::CreateRoleRequest>,
) -> axum::response::Response {
    let data = NewRole {
        display_name: body.display_name,
        description: body.description,
        permissions: body.permissions,
        priority: body.priority,
        color: body.color,
    };

    match services.registry.create(data, session.user.id).await {
        Ok(role) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "success": true, "data": role })),
        )
            .into_response(),
        Err(err) => errors::auth_error_to_response(err),
    }
}

/// PUT /roles/:id
pub async fn update_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateRoleRequest>,
) -> axum::response::Response {
    let Ok(id) = id.parse::<RoleId>() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid role id");
    };

    match services.roles.find_by_id(id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "role not found")
        }
        Err(e) => return errors::auth_error_to_response(e.into()),
    }

    match services.registry.update(id, body.into(), session.user.id).await {
        Ok(role) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "data": role })),
        )
            .into_response(),
        Err(err) => errors::auth_error_to_response(err),
    }
}

/// DELETE /roles/:id
pub async fn delete_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Ok(id) = id.parse::<RoleId>() else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid role id");
    };

    match services.roles.find_by_id(id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "role not found")
        }
        Err(e) => return errors::auth_error_to_response(e.into()),
    }

    match services.registry.delete(id, session.user.id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true })),
        )
            .into_response(),
        Err(err) => errors::auth_error_to_response(err),
    }
}
