//! Permission catalog: the finite registry of atomic capabilities.

use std::sync::Arc;

use serde::Deserialize;

use millworks_auth::permission::PermissionUpdate;
use millworks_auth::{Action, AuthError, Permission, PermissionCategory};
use millworks_core::{Clock, PermissionId, UserId};

use crate::store::{PermissionStore, RoleStore};

/// Input for creating a permission.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPermission {
    pub display_name: String,
    pub category: PermissionCategory,
    pub action: Action,
    pub resource: String,
    #[serde(default)]
    pub is_system_permission: bool,
}

/// Administrative surface over the permission collection.
///
/// Deletion preconditions are explicit checks here, at the call site, not
/// lifecycle hooks buried in the store.
pub struct PermissionCatalog {
    permissions: Arc<dyn PermissionStore>,
    roles: Arc<dyn RoleStore>,
    clock: Arc<dyn Clock>,
}

impl PermissionCatalog {
    pub fn new(
        permissions: Arc<dyn PermissionStore>,
        roles: Arc<dyn RoleStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            permissions,
            roles,
            clock,
        }
    }

    pub async fn get(&self, id: PermissionId) -> Result<Permission, AuthError> {
        self.permissions
            .find_by_id(id)
            .await?
            .ok_or_else(|| AuthError::invalid_reference(format!("permission {id} not found")))
    }

    pub async fn list(&self) -> Result<Vec<Permission>, AuthError> {
        Ok(self.permissions.list().await?)
    }

    /// Active permissions in one category, ordered by display name.
    pub async fn find_by_category(
        &self,
        category: PermissionCategory,
    ) -> Result<Vec<Permission>, AuthError> {
        let mut matches: Vec<Permission> = self
            .permissions
            .list()
            .await?
            .into_iter()
            .filter(|p| p.category == category && p.is_active)
            .collect();
        matches.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        Ok(matches)
    }

    /// Lookup by the derived `{action}_{resource}` key.
    pub async fn exists(
        &self,
        action: Action,
        resource: &str,
    ) -> Result<Option<Permission>, AuthError> {
        let name = millworks_auth::permission::derive_name(action, resource);
        Ok(self.permissions.find_by_name(&name).await?)
    }

    pub async fn create(
        &self,
        data: NewPermission,
        actor: UserId,
    ) -> Result<Permission, AuthError> {
        let mut permission = Permission::new(
            data.display_name,
            data.category,
            data.action,
            &data.resource,
            self.clock.now(),
        )?;
        if data.is_system_permission {
            permission = permission.system();
        }

        if self
            .permissions
            .find_by_name(&permission.name)
            .await?
            .is_some()
        {
            return Err(AuthError::DuplicateKey { field: "name" });
        }

        let created = self.permissions.insert(permission).await?;
        tracing::info!(
            actor = %actor,
            permission = %created.name,
            "permission created"
        );
        Ok(created)
    }

    /// Idempotent creation: an existing match wins over a new record.
    pub async fn find_or_create(
        &self,
        data: NewPermission,
        actor: UserId,
    ) -> Result<Permission, AuthError> {
        if let Some(existing) = self.exists(data.action, &data.resource).await? {
            return Ok(existing);
        }
        self.create(data, actor).await
    }

    pub async fn update(
        &self,
        id: PermissionId,
        patch: PermissionUpdate,
        actor: UserId,
    ) -> Result<Permission, AuthError> {
        let mut permission = self.get(id).await?;
        let old_name = permission.name.clone();
        permission.apply(patch)?;

        if permission.name != old_name {
            if let Some(clash) = self.permissions.find_by_name(&permission.name).await? {
                if clash.id != permission.id {
                    return Err(AuthError::DuplicateKey { field: "name" });
                }
            }
        }

        self.permissions.save(&permission).await?;
        tracing::info!(
            actor = %actor,
            permission = %permission.name,
            "permission updated"
        );
        Ok(permission)
    }

    /// Delete, blocked while protected or referenced.
    pub async fn delete(&self, id: PermissionId, actor: UserId) -> Result<(), AuthError> {
        let permission = self.get(id).await?;

        if permission.is_system_permission {
            return Err(AuthError::conflict(format!(
                "permission '{}' is a system permission and cannot be deleted",
                permission.name
            )));
        }

        let role_count = self.roles.count_with_permission(id).await?;
        if role_count > 0 {
            return Err(AuthError::conflict(format!(
                "permission '{}' is referenced by {role_count} role(s)",
                permission.name
            )));
        }

        self.permissions.delete(id).await?;
        tracing::info!(
            actor = %actor,
            permission = %permission.name,
            "permission deleted"
        );
        Ok(())
    }
}
