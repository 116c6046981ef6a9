//! In-memory store implementations for tests/dev.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use millworks_auth::{Permission, Role, User};
use millworks_core::{PermissionId, RoleId, UserId};

use super::{PermissionStore, RoleStore, StoreError, UserStore};

fn poisoned() -> StoreError {
    StoreError::new("store lock poisoned")
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory user collection.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_employee_id(&self, employee_id: &str) -> Result<Option<User>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map
            .values()
            .find(|u| u.employee_id.as_deref() == Some(employee_id))
            .cloned())
    }

    async fn insert(&self, user: User) -> Result<User, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert(user.id, user.clone());
        Ok(user)
    }

    async fn save(&self, user: &User) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert(user.id, user.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let mut users: Vec<User> = map.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn count_with_role(&self, role: RoleId) -> Result<u64, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map
            .values()
            .filter(|u| u.role_id() == Some(role))
            .count() as u64)
    }

    async fn delete(&self, id: UserId) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.remove(&id);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Roles
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory role collection.
#[derive(Debug, Default)]
pub struct InMemoryRoleStore {
    inner: RwLock<HashMap<RoleId, Role>>,
}

impl InMemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoleStore for InMemoryRoleStore {
    async fn find_by_id(&self, id: RoleId) -> Result<Option<Role>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.values().find(|r| r.name == name).cloned())
    }

    async fn insert(&self, role: Role) -> Result<Role, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert(role.id, role.clone());
        Ok(role)
    }

    async fn save(&self, role: &Role) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert(role.id, role.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Role>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let mut roles: Vec<Role> = map.values().cloned().collect();
        roles.sort_by_key(|r| r.created_at);
        Ok(roles)
    }

    async fn count_with_permission(&self, permission: PermissionId) -> Result<u64, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map
            .values()
            .filter(|r| r.references_permission(permission))
            .count() as u64)
    }

    async fn delete(&self, id: RoleId) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.remove(&id);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Permissions
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory permission collection.
#[derive(Debug, Default)]
pub struct InMemoryPermissionStore {
    inner: RwLock<HashMap<PermissionId, Permission>>,
}

impl InMemoryPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PermissionStore for InMemoryPermissionStore {
    async fn find_by_id(&self, id: PermissionId) -> Result<Option<Permission>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Permission>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.values().find(|p| p.name == name).cloned())
    }

    async fn find_by_ids(&self, ids: &[PermissionId]) -> Result<Vec<Permission>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(ids.iter().filter_map(|id| map.get(id).cloned()).collect())
    }

    async fn insert(&self, permission: Permission) -> Result<Permission, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert(permission.id, permission.clone());
        Ok(permission)
    }

    async fn save(&self, permission: &Permission) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert(permission.id, permission.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Permission>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let mut permissions: Vec<Permission> = map.values().cloned().collect();
        permissions.sort_by_key(|p| p.created_at);
        Ok(permissions)
    }

    async fn delete(&self, id: PermissionId) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.remove(&id);
        Ok(())
    }
}
