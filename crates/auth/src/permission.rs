//! Permission records: atomic capabilities keyed by an (action, resource) pair.

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use millworks_core::PermissionId;

use crate::error::AuthError;

// ─────────────────────────────────────────────────────────────────────────────
// Action
// ─────────────────────────────────────────────────────────────────────────────

/// Verb half of a permission name.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Manage,
    View,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Manage => "manage",
            Action::View => "view",
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Action::Create),
            "read" => Ok(Action::Read),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            "manage" => Ok(Action::Manage),
            "view" => Ok(Action::View),
            other => Err(AuthError::validation(format!("unknown action '{other}'"))),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Category
// ─────────────────────────────────────────────────────────────────────────────

/// Closed grouping used for catalog listings and admin UIs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionCategory {
    UserManagement,
    RoleManagement,
    PermissionManagement,
    ProductManagement,
    TransactionManagement,
    ExpenseManagement,
    ReportManagement,
    SystemSettings,
    AuditLogs,
}

impl PermissionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionCategory::UserManagement => "user_management",
            PermissionCategory::RoleManagement => "role_management",
            PermissionCategory::PermissionManagement => "permission_management",
            PermissionCategory::ProductManagement => "product_management",
            PermissionCategory::TransactionManagement => "transaction_management",
            PermissionCategory::ExpenseManagement => "expense_management",
            PermissionCategory::ReportManagement => "report_management",
            PermissionCategory::SystemSettings => "system_settings",
            PermissionCategory::AuditLogs => "audit_logs",
        }
    }
}

impl core::fmt::Display for PermissionCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionCategory {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user_management" => Ok(PermissionCategory::UserManagement),
            "role_management" => Ok(PermissionCategory::RoleManagement),
            "permission_management" => Ok(PermissionCategory::PermissionManagement),
            "product_management" => Ok(PermissionCategory::ProductManagement),
            "transaction_management" => Ok(PermissionCategory::TransactionManagement),
            "expense_management" => Ok(PermissionCategory::ExpenseManagement),
            "report_management" => Ok(PermissionCategory::ReportManagement),
            "system_settings" => Ok(PermissionCategory::SystemSettings),
            "audit_logs" => Ok(PermissionCategory::AuditLogs),
            other => Err(AuthError::validation(format!(
                "unknown permission category '{other}'"
            ))),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Permission
// ─────────────────────────────────────────────────────────────────────────────

/// One atomic capability.
///
/// # Invariants
/// - `name` is always `{action}_{resource}` and is recomputed whenever either
///   side changes; it is the uniqueness key for the whole catalog.
/// - `resource` is a lowercase token (`[a-z][a-z0-9_]*`).
/// - A permission with `is_system_permission = true` cannot be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: PermissionId,
    pub name: String,
    pub display_name: String,
    pub category: PermissionCategory,
    pub action: Action,
    pub resource: String,
    pub is_active: bool,
    pub is_system_permission: bool,
    pub created_at: DateTime<Utc>,
}

/// Patch applied through the catalog's update path.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PermissionUpdate {
    pub display_name: Option<String>,
    pub category: Option<PermissionCategory>,
    pub action: Option<Action>,
    pub resource: Option<String>,
    pub is_active: Option<bool>,
}

impl Permission {
    pub fn new(
        display_name: impl Into<String>,
        category: PermissionCategory,
        action: Action,
        resource: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Self, AuthError> {
        let resource = validate_resource(resource)?;
        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Err(AuthError::validation("display name cannot be empty"));
        }

        Ok(Self {
            id: PermissionId::new(),
            name: derive_name(action, &resource),
            display_name,
            category,
            action,
            resource,
            is_active: true,
            is_system_permission: false,
            created_at,
        })
    }

    pub fn system(mut self) -> Self {
        self.is_system_permission = true;
        self
    }

    /// Apply a patch, re-deriving `name` if action or resource moved.
    pub fn apply(&mut self, patch: PermissionUpdate) -> Result<(), AuthError> {
        if let Some(display_name) = patch.display_name {
            if display_name.trim().is_empty() {
                return Err(AuthError::validation("display name cannot be empty"));
            }
            self.display_name = display_name;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(action) = patch.action {
            self.action = action;
        }
        if let Some(resource) = patch.resource {
            self.resource = validate_resource(&resource)?;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.name = derive_name(self.action, &self.resource);
        Ok(())
    }

    /// Match by derived name or by identity (stringified id).
    pub fn matches(&self, needle: &str) -> bool {
        self.name == needle || self.id.to_string() == needle
    }
}

/// The uniqueness key: `{action}_{resource}`.
pub fn derive_name(action: Action, resource: &str) -> String {
    format!("{}_{}", action.as_str(), resource)
}

fn validate_resource(resource: &str) -> Result<String, AuthError> {
    let resource = resource.trim().to_lowercase();
    let mut chars = resource.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {
            chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        }
        _ => false,
    };
    if !valid {
        return Err(AuthError::validation(format!(
            "resource must be a lowercase token, got '{resource}'"
        )));
    }
    Ok(resource)
}
