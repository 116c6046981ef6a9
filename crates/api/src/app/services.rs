//! Service wiring: stores, catalog/registry, authentication gate and the
//! session resolver, assembled once at startup.

use std::sync::Arc;

use millworks_auth::TokenService;
use millworks_core::{Clock, SystemClock};
use millworks_infra::{
    seed, AuthConfig, AuthenticationGate, InMemoryPermissionStore, InMemoryRoleStore,
    InMemoryUserStore, PermissionCatalog, PermissionStore, RoleRegistry, RoleStore,
    SessionResolver, UserStore,
};

/// Everything the handlers need, wired against one shared store.
pub struct AppServices {
    pub config: AuthConfig,
    pub users: Arc<dyn UserStore>,
    pub roles: Arc<dyn RoleStore>,
    pub permissions: Arc<dyn PermissionStore>,
    pub catalog: PermissionCatalog,
    pub registry: RoleRegistry,
    pub gate: AuthenticationGate,
    pub resolver: SessionResolver,
    pub tokens: TokenService,
}

/// Wire services against the in-memory document store and bootstrap the
/// system catalog (permissions, protected roles, first administrator).
pub async fn build_services(
    config: AuthConfig,
    admin_email: &str,
    admin_password: &str,
) -> AppServices {
    let users: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());
    let roles: Arc<dyn RoleStore> = Arc::new(InMemoryRoleStore::new());
    let permissions: Arc<dyn PermissionStore> = Arc::new(InMemoryPermissionStore::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let tokens = config.token_service();
    let catalog = PermissionCatalog::new(permissions.clone(), roles.clone(), clock.clone());
    let registry = RoleRegistry::new(
        roles.clone(),
        permissions.clone(),
        users.clone(),
        clock.clone(),
    );
    let gate = AuthenticationGate::new(
        users.clone(),
        tokens.clone(),
        config.lockout,
        config.min_password_len,
        clock.clone(),
    );
    let resolver = SessionResolver::new(
        users.clone(),
        roles.clone(),
        permissions.clone(),
        clock.clone(),
    );

    match seed::seed_defaults(&catalog, &roles, &users, admin_email, admin_password, &clock).await
    {
        Ok(summary) => tracing::info!(
            permissions_created = summary.permissions_created,
            roles_created = summary.roles_created,
            admin_created = summary.admin_created,
            "system catalog bootstrapped"
        ),
        Err(e) => tracing::error!(error = %e, "system catalog bootstrap failed"),
    }

    AppServices {
        config,
        users,
        roles,
        permissions,
        catalog,
        registry,
        gate,
        resolver,
        tokens,
    }
}
