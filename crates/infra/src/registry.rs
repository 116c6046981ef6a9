//! Role registry: administrative management of permission bundles.

use std::sync::Arc;

use serde::Deserialize;

use millworks_auth::role::RoleUpdate;
use millworks_auth::{normalize_role_name, AuthError, Permission, Role};
use millworks_core::{Clock, PermissionId, RoleId, UserId};

use crate::store::{PermissionStore, RoleStore, UserStore};

/// Input for creating a role.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRole {
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

/// Administrative surface over the role collection.
pub struct RoleRegistry {
    roles: Arc<dyn RoleStore>,
    permissions: Arc<dyn PermissionStore>,
    users: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
}

impl RoleRegistry {
    pub fn new(
        roles: Arc<dyn RoleStore>,
        permissions: Arc<dyn PermissionStore>,
        users: Arc<dyn UserStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            roles,
            permissions,
            users,
            clock,
        }
    }

    pub async fn get(&self, id: RoleId) -> Result<Role, AuthError> {
        self.roles
            .find_by_id(id)
            .await?
            .ok_or_else(|| AuthError::invalid_reference(format!("role {id} not found")))
    }

    pub async fn list(&self) -> Result<Vec<Role>, AuthError> {
        Ok(self.roles.list().await?)
    }

    pub async fn create(&self, data: NewRole, actor: UserId) -> Result<Role, AuthError> {
        let name = normalize_role_name(&data.display_name);
        if self.roles.find_by_name(&name).await?.is_some() {
            return Err(AuthError::DuplicateKey { field: "name" });
        }

        let permissions = self.validate_permission_set(data.permissions).await?;

        let mut role = Role::new(data.display_name, permissions, data.priority, self.clock.now())?;
        role.description = data.description;
        role.color = data.color;

        let created = self.roles.insert(role).await?;
        tracing::info!(actor = %actor, role = %created.name, "role created");
        Ok(created)
    }

    pub async fn update(
        &self,
        id: RoleId,
        patch: RoleUpdate,
        actor: UserId,
    ) -> Result<Role, AuthError> {
        let mut role = self.get(id).await?;

        if role.is_system_role && patch.touches_protected_fields() {
            return Err(AuthError::forbidden(format!(
                "role '{}' is a system role; its permissions and active state are immutable",
                role.name
            )));
        }

        if let Some(display_name) = patch.display_name {
            let name = normalize_role_name(&display_name);
            if name.is_empty() {
                return Err(AuthError::validation("role name cannot be empty"));
            }
            if let Some(clash) = self.roles.find_by_name(&name).await? {
                if clash.id != role.id {
                    return Err(AuthError::DuplicateKey { field: "name" });
                }
            }
            role.display_name = display_name;
            role.name = name;
        }
        if let Some(description) = patch.description {
            role.description = Some(description);
        }
        if let Some(permissions) = patch.permissions {
            role.permissions = self.validate_permission_set(permissions).await?;
        }
        if let Some(priority) = patch.priority {
            role.priority = priority;
        }
        if let Some(color) = patch.color {
            role.color = Some(color);
        }
        if let Some(is_active) = patch.is_active {
            role.is_active = is_active;
        }

        self.roles.save(&role).await?;
        tracing::info!(actor = %actor, role = %role.name, "role updated");
        Ok(role)
    }

    /// Delete, blocked while protected or referenced.
    pub async fn delete(&self, id: RoleId, actor: UserId) -> Result<(), AuthError> {
        let role = self.get(id).await?;

        if role.is_system_role {
            return Err(AuthError::forbidden(format!(
                "role '{}' is a system role and cannot be deleted",
                role.name
            )));
        }

        let user_count = self.users.count_with_role(id).await?;
        if user_count > 0 {
            return Err(AuthError::conflict(format!(
                "role '{}' is assigned to {user_count} user(s)",
                role.name
            )));
        }

        self.roles.delete(id).await?;
        tracing::info!(actor = %actor, role = %role.name, "role deleted");
        Ok(())
    }

    /// All roles, highest authority first; creation order breaks ties.
    pub async fn hierarchy(&self) -> Result<Vec<Role>, AuthError> {
        let mut roles = self.roles.list().await?;
        roles.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(roles)
    }

    /// Does the role grant this permission (by name or identity)?
    pub async fn has_permission(&self, role: &Role, needle: &str) -> Result<bool, AuthError> {
        let expanded = self.permissions.find_by_ids(&role.permissions).await?;
        Ok(expanded.iter().any(|p| p.matches(needle)))
    }

    /// Validate a requested permission set as a whole: every id must resolve
    /// to an active permission or the entire operation is rejected, never
    /// partially applied.
    async fn validate_permission_set(
        &self,
        requested: Vec<PermissionId>,
    ) -> Result<Vec<PermissionId>, AuthError> {
        let mut ids = requested;
        let mut seen = std::collections::HashSet::new();
        ids.retain(|id| seen.insert(*id));

        let found: Vec<Permission> = self
            .permissions
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .filter(|p| p.is_active)
            .collect();

        if found.len() != ids.len() {
            return Err(AuthError::invalid_reference(format!(
                "{} of {} permission id(s) do not resolve to active permissions",
                ids.len() - found.len(),
                ids.len()
            )));
        }

        Ok(ids)
    }
}
