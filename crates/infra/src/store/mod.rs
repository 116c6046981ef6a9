//! Document-store boundary.
//!
//! The backing store is treated as an external key-indexed document store:
//! lookup by identifier or unique field, atomic whole-document save, and
//! selector counts. Everything here is read-heavy and lock-free from the
//! caller's perspective; the two mutating hot paths (login-attempt counters,
//! `last_login`) are whole-document read-modify-write with last-writer-wins
//! semantics.

mod memory;

use async_trait::async_trait;
use thiserror::Error;

use millworks_auth::{AuthError, Permission, Role, User};
use millworks_core::{PermissionId, RoleId, UserId};

pub use memory::{InMemoryPermissionStore, InMemoryRoleStore, InMemoryUserStore};

/// Unexpected persistence failure. Logged at the call site, surfaced to API
/// clients as a generic 500.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("store error: {0}")]
pub struct StoreError(pub String);

impl StoreError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::Store(err.0)
    }
}

/// User collection.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_employee_id(&self, employee_id: &str) -> Result<Option<User>, StoreError>;
    async fn insert(&self, user: User) -> Result<User, StoreError>;
    /// Whole-document save (last writer wins).
    async fn save(&self, user: &User) -> Result<(), StoreError>;
    async fn list(&self) -> Result<Vec<User>, StoreError>;
    async fn count_with_role(&self, role: RoleId) -> Result<u64, StoreError>;
    async fn delete(&self, id: UserId) -> Result<(), StoreError>;
}

/// Role collection.
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn find_by_id(&self, id: RoleId) -> Result<Option<Role>, StoreError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, StoreError>;
    async fn insert(&self, role: Role) -> Result<Role, StoreError>;
    async fn save(&self, role: &Role) -> Result<(), StoreError>;
    async fn list(&self) -> Result<Vec<Role>, StoreError>;
    async fn count_with_permission(&self, permission: PermissionId) -> Result<u64, StoreError>;
    async fn delete(&self, id: RoleId) -> Result<(), StoreError>;
}

/// Permission collection.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    async fn find_by_id(&self, id: PermissionId) -> Result<Option<Permission>, StoreError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Permission>, StoreError>;
    /// Fetch every permission whose id is in `ids` (missing ids are simply
    /// absent from the result; callers compare counts).
    async fn find_by_ids(&self, ids: &[PermissionId]) -> Result<Vec<Permission>, StoreError>;
    async fn insert(&self, permission: Permission) -> Result<Permission, StoreError>;
    async fn save(&self, permission: &Permission) -> Result<(), StoreError>;
    async fn list(&self) -> Result<Vec<Permission>, StoreError>;
    async fn delete(&self, id: PermissionId) -> Result<(), StoreError>;
}
