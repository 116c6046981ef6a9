//! Session resolution: from a verified user identifier to a fully resolved
//! role and permission set.

use std::sync::Arc;

use millworks_auth::{AuthError, Permission, Role, RoleRef, Session};
use millworks_core::{Clock, UserId};

use crate::store::{PermissionStore, RoleStore, UserStore};

/// Loads the user behind a verified token and forces its role reference.
///
/// The repair step exists because some write paths persist the role as a bare
/// pointer rather than an expanded document. Authorization must never proceed
/// against a pointer it cannot interpret as a set of permissions: an
/// unresolvable pointer is an authentication failure, not an empty grant.
pub struct SessionResolver {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
    permissions: Arc<dyn PermissionStore>,
    clock: Arc<dyn Clock>,
}

impl SessionResolver {
    pub fn new(
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleStore>,
        permissions: Arc<dyn PermissionStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            roles,
            permissions,
            clock,
        }
    }

    pub async fn resolve(&self, user_id: UserId) -> Result<Session, AuthError> {
        let Some(mut user) = self.users.find_by_id(user_id).await? else {
            return Err(AuthError::SessionInvalid);
        };
        if !user.is_active {
            return Err(AuthError::SessionInvalid);
        }

        let role = match user.role.clone() {
            None => return Err(AuthError::RoleMissing),
            Some(RoleRef::Resolved(role)) => *role,
            Some(RoleRef::Unresolved(role_id)) => {
                // Repair: force the pointer. A dangling reference means the
                // system cannot vouch for this principal.
                match self.roles.find_by_id(role_id).await? {
                    Some(role) => {
                        tracing::debug!(
                            user_id = %user.id,
                            role_id = %role_id,
                            "re-resolved unexpanded role reference"
                        );
                        role
                    }
                    None => {
                        tracing::warn!(
                            user_id = %user.id,
                            role_id = %role_id,
                            "role reference does not resolve to a stored role"
                        );
                        return Err(AuthError::RoleNotFound);
                    }
                }
            }
        };

        let permissions = self.expand_permissions(&role).await?;

        // Touch last_login best-effort: a persistence failure here must not
        // fail the request. The stored document keeps the role as a pointer
        // so a later role edit is picked up on the next resolution; only the
        // in-flight session carries the expanded copy.
        user.last_login = Some(self.clock.now());
        let mut persisted = user.clone();
        persisted.role = Some(RoleRef::Unresolved(role.id));
        if let Err(e) = self.users.save(&persisted).await {
            tracing::warn!(user_id = %user.id, error = %e, "failed to persist last_login");
        }

        user.role = Some(RoleRef::from(role.clone()));
        Ok(Session {
            user,
            role,
            permissions,
        })
    }

    async fn expand_permissions(&self, role: &Role) -> Result<Vec<Permission>, AuthError> {
        let expanded = self
            .permissions
            .find_by_ids(&role.permissions)
            .await?
            .into_iter()
            .filter(|p| p.is_active)
            .collect();
        Ok(expanded)
    }
}
