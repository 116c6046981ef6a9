//! Permission catalog administration.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};

use millworks_auth::Session;
use millworks_core::PermissionId;
use millworks_infra::NewPermission;

use crate::app::{dto, errors, services::AppServices};
use crate::guard::require_permission;

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            get(list_permissions)
                .layer(axum::middleware::from_fn(require_permission("read_permission"))),
        )
        .route(
            "/",
            post(create_permission)
                .layer(axum::middleware::from_fn(require_permission("create_permission"))),
        )
        .route(
            "/:id",
            get(get_permission)
                .layer(axum::middleware::from_fn(require_permission("read_permission"))),
        )
        .route(
            "/:id",
            put(update_permission)
                .layer(axum::middleware::from_fn(require_permission("update_permission"))),
        )
        .route(
            "/:id",
            delete(delete_permission)
                .layer(axum::middleware::from_fn(require_permission("delete_permission"))),
        )
}

/// GET /permissions[?category=]
pub async fn list_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::PermissionListQuery>,
) -> axum::response::Response {
    let result = match query.category {
        Some(category) => services.catalog.find_by_category(category).await,
        None => services.catalog.list().await,
    };

    match result {
        Ok(permissions) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "count": permissions.len(),
                "data": permissions,
            })),
        )
            .into_response(),
        Err(err) => errors::auth_error_to_response(err),
    }
}

/// GET /permissions/:id
pub async fn get_permission(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Ok(id) = id.parse::<PermissionId>() else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_id",
            "invalid permission id",
        );
    };

    match services.permissions.find_by_id(id).await {
        Ok(Some(permission)) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "data": permission })),
        )
            .into_response(),
        Ok(None) => {
            errors::json_error(StatusCode::NOT_FOUND, "not_found", "permission not found")
        }
        Err(e) => errors::auth_error_to_response(e.into()),
    }
}

/// POST /permissions
pub async fn create_permission(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Session>,
    Json(body): Json<dto::CreatePermissionRequest>,
) -> axum::response::Response {
    let data = NewPermission {
        display_name: body.display_name,
        category: body.category,
        action: body.action,
        resource: body.resource,
        is_system_permission: body.is_system_permission,
    };

    match services.catalog.create(data, session.user.id).await {
        Ok(permission) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "success": true, "data": permission })),
        )
            .into_response(),
        Err(err) => errors::auth_error_to_response(err),
    }
}

/// PUT /permissions/:id
pub async fn update_permission(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdatePermissionRequest>,
) -> axum::response::Response {
    let Ok(id) = id.parse::<PermissionId>() else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_id",
            "invalid permission id",
        );
    };

    match services.permissions.find_by_id(id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "permission not found")
        }
        Err(e) => return errors::auth_error_to_response(e.into()),
    }

    match services.catalog.update(id, body.into(), session.user.id).await {
        Ok(permission) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "data": permission })),
        )
            .into_response(),
        Err(err) => errors::auth_error_to_response(err),
    }
}

/// DELETE /permissions/:id
pub async fn delete_permission(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(session): Extension<Session>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Ok(id) = id.parse::<PermissionId>() else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_id",
            "invalid permission id",
        );
    };

    match services.permissions.find_by_id(id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "permission not found")
        }
        Err(e) => return errors::auth_error_to_response(e.into()),
    }

    match services.catalog.delete(id, session.user.id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true })),
        )
            .into_response(),
        Err(err) => errors::auth_error_to_response(err),
    }
}
