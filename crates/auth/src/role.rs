//! Role records: administratively managed bundles of permissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use millworks_core::{PermissionId, RoleId};

use crate::error::AuthError;

/// A named bundle of permissions with a priority ranking.
///
/// # Invariants
/// - `name` is normalized (lowercase, hyphenated) and unique in the registry.
/// - A role with `is_system_role = true` cannot be deleted and cannot have its
///   permission set or active flag altered through the standard update path.
/// - `permissions` holds references; expansion to live [`crate::Permission`]
///   records happens at resolution time, never implicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub permissions: Vec<PermissionId>,
    /// Higher priority means more authority; used for hierarchy listings.
    pub priority: i32,
    /// Presentation-only hint for admin UIs.
    pub color: Option<String>,
    pub is_active: bool,
    pub is_system_role: bool,
    pub created_at: DateTime<Utc>,
}

/// Patch applied through the registry's update path.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoleUpdate {
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub permissions: Option<Vec<PermissionId>>,
    pub priority: Option<i32>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
}

impl RoleUpdate {
    /// True when the patch touches fields a system role refuses to change.
    pub fn touches_protected_fields(&self) -> bool {
        self.permissions.is_some() || self.is_active == Some(false)
    }
}

impl Role {
    pub fn new(
        display_name: impl Into<String>,
        permissions: Vec<PermissionId>,
        priority: i32,
        created_at: DateTime<Utc>,
    ) -> Result<Self, AuthError> {
        let display_name = display_name.into();
        let name = normalize_role_name(&display_name);
        if name.is_empty() {
            return Err(AuthError::validation("role name cannot be empty"));
        }

        Ok(Self {
            id: RoleId::new(),
            name,
            display_name,
            description: None,
            permissions,
            priority,
            color: None,
            is_active: true,
            is_system_role: false,
            created_at,
        })
    }

    pub fn system(mut self) -> Self {
        self.is_system_role = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Membership check against the reference set (id-level only; name-level
    /// matching requires the expanded permission records).
    pub fn references_permission(&self, id: PermissionId) -> bool {
        self.permissions.contains(&id)
    }
}

/// Normalize a role name: trim, lowercase, spaces/underscores to hyphens,
/// runs collapsed.
pub fn normalize_role_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_hyphen = true; // suppress a leading hyphen
    for c in name.trim().chars() {
        let mapped = match c {
            ' ' | '_' | '-' => '-',
            c => c.to_ascii_lowercase(),
        };
        if mapped == '-' {
            if !last_was_hyphen {
                out.push('-');
            }
            last_was_hyphen = true;
        } else {
            out.push(mapped);
            last_was_hyphen = false;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}
