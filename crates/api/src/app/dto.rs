//! Request DTOs.
//!
//! Field names follow the wire contract the admin frontend already speaks
//! (camelCase); domain records keep their own serialization.

use serde::Deserialize;

use millworks_auth::permission::PermissionUpdate;
use millworks_auth::role::RoleUpdate;
use millworks_auth::{Action, PermissionCategory};
use millworks_core::{PermissionId, RoleId};

// -------------------------
// Auth
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub role: RoleId,
    #[serde(default)]
    pub employee_id: Option<String>,
}

// -------------------------
// Users
// -------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub employee_id: Option<String>,
    pub role: Option<RoleId>,
    pub is_active: Option<bool>,
}

// -------------------------
// Roles
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleRequest {
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<PermissionId>,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub permissions: Option<Vec<PermissionId>>,
    pub priority: Option<i32>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
}

impl From<UpdateRoleRequest> for RoleUpdate {
    fn from(req: UpdateRoleRequest) -> Self {
        RoleUpdate {
            display_name: req.display_name,
            description: req.description,
            permissions: req.permissions,
            priority: req.priority,
            color: req.color,
            is_active: req.is_active,
        }
    }
}

// -------------------------
// Permissions
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePermissionRequest {
    pub display_name: String,
    pub category: PermissionCategory,
    pub action: Action,
    pub resource: String,
    #[serde(default)]
    pub is_system_permission: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePermissionRequest {
    pub display_name: Option<String>,
    pub category: Option<PermissionCategory>,
    pub action: Option<Action>,
    pub resource: Option<String>,
    pub is_active: Option<bool>,
}

impl From<UpdatePermissionRequest> for PermissionUpdate {
    fn from(req: UpdatePermissionRequest) -> Self {
        PermissionUpdate {
            display_name: req.display_name,
            category: req.category,
            action: req.action,
            resource: req.resource,
            is_active: req.is_active,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PermissionListQuery {
    pub category: Option<PermissionCategory>,
}
