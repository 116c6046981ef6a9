//! Resolved request session.

use serde::Serialize;

use crate::permission::Permission;
use crate::role::Role;
use crate::user::User;

/// The runtime pairing of a user with its role and that role's live
/// permission set, valid for the duration of one request.
///
/// Construction goes through the session resolver, which guarantees the role
/// reference has been forced: a `Session` never wraps an unresolved pointer.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user: User,
    pub role: Role,
    pub permissions: Vec<Permission>,
}

impl Session {
    pub fn role_name(&self) -> &str {
        &self.role.name
    }

    pub fn has_permission(&self, needle: &str) -> bool {
        self.permissions.iter().any(|p| p.matches(needle))
    }
}
