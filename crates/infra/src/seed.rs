//! Idempotent bootstrap of the system catalog: built-in permissions, the
//! protected roles, and the first administrator account.
//!
//! Everything here goes through `find_or_create`-style paths, so running the
//! bootstrap against an already-populated store is a no-op.

use std::sync::Arc;

use millworks_auth::{password, Action, AuthError, PermissionCategory, Role, User};
use millworks_core::{Clock, PermissionId, UserId};

use crate::catalog::{NewPermission, PermissionCatalog};
use crate::store::{RoleStore, UserStore};

/// Built-in permission catalog. These carry `is_system_permission` and can
/// never be deleted through the admin surface.
pub const SYSTEM_PERMISSIONS: &[(&str, PermissionCategory, Action, &str)] = &[
    // User management
    ("Create users", PermissionCategory::UserManagement, Action::Create, "user"),
    ("Read users", PermissionCategory::UserManagement, Action::Read, "user"),
    ("Update users", PermissionCategory::UserManagement, Action::Update, "user"),
    ("Delete users", PermissionCategory::UserManagement, Action::Delete, "user"),
    // Role management
    ("Create roles", PermissionCategory::RoleManagement, Action::Create, "role"),
    ("Read roles", PermissionCategory::RoleManagement, Action::Read, "role"),
    ("Update roles", PermissionCategory::RoleManagement, Action::Update, "role"),
    ("Delete roles", PermissionCategory::RoleManagement, Action::Delete, "role"),
    // Permission management
    ("Create permissions", PermissionCategory::PermissionManagement, Action::Create, "permission"),
    ("Read permissions", PermissionCategory::PermissionManagement, Action::Read, "permission"),
    ("Update permissions", PermissionCategory::PermissionManagement, Action::Update, "permission"),
    ("Delete permissions", PermissionCategory::PermissionManagement, Action::Delete, "permission"),
    // Business areas gated by the admin backend
    ("Manage products", PermissionCategory::ProductManagement, Action::Manage, "product"),
    ("Read products", PermissionCategory::ProductManagement, Action::Read, "product"),
    ("Manage transactions", PermissionCategory::TransactionManagement, Action::Manage, "transaction"),
    ("Read transactions", PermissionCategory::TransactionManagement, Action::Read, "transaction"),
    ("Manage expenses", PermissionCategory::ExpenseManagement, Action::Manage, "expense"),
    ("Read expenses", PermissionCategory::ExpenseManagement, Action::Read, "expense"),
    // Reporting, settings, audit
    ("View reports", PermissionCategory::ReportManagement, Action::View, "report"),
    ("Manage settings", PermissionCategory::SystemSettings, Action::Manage, "settings"),
    ("View audit logs", PermissionCategory::AuditLogs, Action::View, "audit_log"),
];

/// Permission names granted to the built-in manager role.
const MANAGER_PERMISSIONS: &[&str] = &[
    "read_user",
    "update_user",
    "manage_product",
    "read_product",
    "manage_transaction",
    "read_transaction",
    "manage_expense",
    "read_expense",
    "view_report",
];

/// Permission names granted to the built-in staff role.
const STAFF_PERMISSIONS: &[&str] = &["read_product", "read_transaction", "view_report"];

/// What the bootstrap ended up doing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeedSummary {
    pub permissions_created: usize,
    pub roles_created: usize,
    pub admin_created: bool,
}

/// Seed the system catalog, protected roles and first administrator.
pub async fn seed_defaults(
    catalog: &PermissionCatalog,
    roles: &Arc<dyn RoleStore>,
    users: &Arc<dyn UserStore>,
    admin_email: &str,
    admin_password: &str,
    clock: &Arc<dyn Clock>,
) -> Result<SeedSummary, AuthError> {
    let actor = UserId::new();
    let mut summary = SeedSummary::default();

    let mut all_permission_ids = Vec::with_capacity(SYSTEM_PERMISSIONS.len());
    let mut by_name: std::collections::HashMap<String, PermissionId> = Default::default();

    for (display_name, category, action, resource) in SYSTEM_PERMISSIONS {
        let before = catalog.exists(*action, resource).await?;
        let permission = catalog
            .find_or_create(
                NewPermission {
                    display_name: (*display_name).to_string(),
                    category: *category,
                    action: *action,
                    resource: (*resource).to_string(),
                    is_system_permission: true,
                },
                actor,
            )
            .await?;
        if before.is_none() {
            summary.permissions_created += 1;
        }
        by_name.insert(permission.name.clone(), permission.id);
        all_permission_ids.push(permission.id);
    }

    let ids_for = |names: &[&str]| -> Vec<PermissionId> {
        names.iter().filter_map(|n| by_name.get(*n).copied()).collect()
    };

    let super_admin = ensure_system_role(
        roles,
        clock,
        "Super Admin",
        "Full authority over the admin backend",
        all_permission_ids,
        100,
        &mut summary,
    )
    .await?;
    ensure_system_role(
        roles,
        clock,
        "Manager",
        "Day-to-day operations and reporting",
        ids_for(MANAGER_PERMISSIONS),
        50,
        &mut summary,
    )
    .await?;
    ensure_system_role(
        roles,
        clock,
        "Staff",
        "Read-only shop-floor access",
        ids_for(STAFF_PERMISSIONS),
        10,
        &mut summary,
    )
    .await?;

    if users.find_by_email(admin_email).await?.is_none() {
        let hash = password::hash_password(admin_password)
            .map_err(|e| AuthError::store(format!("password hashing failed: {e}")))?;
        let admin = User::new(admin_email, "Administrator", hash, super_admin.id, clock.now())?;
        users.insert(admin).await?;
        summary.admin_created = true;
        tracing::info!(email = admin_email, "bootstrap administrator created");
    }

    Ok(summary)
}

async fn ensure_system_role(
    roles: &Arc<dyn RoleStore>,
    clock: &Arc<dyn Clock>,
    display_name: &str,
    description: &str,
    permissions: Vec<PermissionId>,
    priority: i32,
    summary: &mut SeedSummary,
) -> Result<Role, AuthError> {
    let name = millworks_auth::normalize_role_name(display_name);
    if let Some(existing) = roles.find_by_name(&name).await? {
        return Ok(existing);
    }

    let role = Role::new(display_name, permissions, priority, clock.now())?
        .with_description(description)
        .system();
    let created = roles.insert(role).await?;
    summary.roles_created += 1;
    tracing::info!(role = %created.name, "system role created");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryPermissionStore, InMemoryRoleStore, InMemoryUserStore};
    use millworks_core::SystemClock;

    struct Fixture {
        catalog: PermissionCatalog,
        roles: Arc<dyn RoleStore>,
        users: Arc<dyn UserStore>,
        clock: Arc<dyn Clock>,
    }

    fn fixture() -> Fixture {
        let permissions = Arc::new(InMemoryPermissionStore::new());
        let roles: Arc<InMemoryRoleStore> = Arc::new(InMemoryRoleStore::new());
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let catalog = PermissionCatalog::new(permissions, roles.clone(), clock.clone());
        Fixture {
            catalog,
            roles,
            users: Arc::new(InMemoryUserStore::new()),
            clock,
        }
    }

    #[tokio::test]
    async fn seeding_twice_is_a_noop() {
        let fx = fixture();

        let first = seed_defaults(
            &fx.catalog,
            &fx.roles,
            &fx.users,
            "admin@millworks.test",
            "bootstrap-password",
            &fx.clock,
        )
        .await
        .unwrap();
        assert_eq!(first.permissions_created, SYSTEM_PERMISSIONS.len());
        assert_eq!(first.roles_created, 3);
        assert!(first.admin_created);

        let second = seed_defaults(
            &fx.catalog,
            &fx.roles,
            &fx.users,
            "admin@millworks.test",
            "bootstrap-password",
            &fx.clock,
        )
        .await
        .unwrap();
        assert_eq!(second.permissions_created, 0);
        assert_eq!(second.roles_created, 0);
        assert!(!second.admin_created);
    }

    #[tokio::test]
    async fn seeded_roles_are_protected() {
        let fx = fixture();
        seed_defaults(
            &fx.catalog,
            &fx.roles,
            &fx.users,
            "admin@millworks.test",
            "bootstrap-password",
            &fx.clock,
        )
        .await
        .unwrap();

        let super_admin = fx.roles.find_by_name("super-admin").await.unwrap().unwrap();
        assert!(super_admin.is_system_role);
        assert_eq!(super_admin.permissions.len(), SYSTEM_PERMISSIONS.len());

        let manager = fx.roles.find_by_name("manager").await.unwrap().unwrap();
        assert!(manager.is_system_role);
        assert_eq!(manager.permissions.len(), MANAGER_PERMISSIONS.len());
    }
}
