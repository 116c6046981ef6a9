//! User records and the role reference union.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use millworks_core::{RoleId, UserId};

use crate::error::AuthError;
use crate::role::Role;

// ─────────────────────────────────────────────────────────────────────────────
// Role reference
// ─────────────────────────────────────────────────────────────────────────────

/// A role reference as it comes back from the document store.
///
/// Some write paths persist the reference as a bare identifier while others
/// embed the expanded role document. The distinction is a compile-time tag:
/// an [`RoleRef::Unresolved`] pointer is never evidence of presence *or*
/// absence of any permission; it must be forced before authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleRef {
    Resolved(Box<Role>),
    Unresolved(RoleId),
}

impl RoleRef {
    pub fn role_id(&self) -> RoleId {
        match self {
            RoleRef::Unresolved(id) => *id,
            RoleRef::Resolved(role) => role.id,
        }
    }

    pub fn as_resolved(&self) -> Option<&Role> {
        match self {
            RoleRef::Resolved(role) => Some(role),
            RoleRef::Unresolved(_) => None,
        }
    }
}

impl From<RoleId> for RoleRef {
    fn from(id: RoleId) -> Self {
        RoleRef::Unresolved(id)
    }
}

impl From<Role> for RoleRef {
    fn from(role: Role) -> Self {
        RoleRef::Resolved(Box::new(role))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User
// ─────────────────────────────────────────────────────────────────────────────

/// An authenticated principal.
///
/// # Invariants
/// - Exactly one role per user (single-role design); `role` may arrive
///   unresolved from the store but never plural.
/// - `password_hash` is never serialized into API payloads.
/// - An inactive or currently-locked user fails authentication regardless of
///   credential correctness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    /// Optional employee badge number; unique when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    pub display_name: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Option<RoleRef>,
    pub is_active: bool,
    pub login_attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        email: impl Into<String>,
        display_name: impl Into<String>,
        password_hash: String,
        role: RoleId,
        created_at: DateTime<Utc>,
    ) -> Result<Self, AuthError> {
        let email = email.into();
        if email.trim().is_empty() || !email.contains('@') {
            return Err(AuthError::validation("invalid email format"));
        }
        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Err(AuthError::validation("display name cannot be empty"));
        }

        Ok(Self {
            id: UserId::new(),
            email,
            employee_id: None,
            display_name,
            password_hash,
            role: Some(RoleRef::Unresolved(role)),
            is_active: true,
            login_attempts: 0,
            lock_until: None,
            last_login: None,
            created_at,
        })
    }

    pub fn with_employee_id(mut self, employee_id: impl Into<String>) -> Self {
        self.employee_id = Some(employee_id.into());
        self
    }

    /// Inside a lock window?
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.lock_until.is_some_and(|until| now < until)
    }

    pub fn role_id(&self) -> Option<RoleId> {
        self.role.as_ref().map(RoleRef::role_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user() -> User {
        User::new(
            "worker@millworks.test",
            "Worker",
            "fake-hash".to_string(),
            RoleId::new(),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn email_must_look_like_an_email() {
        let result = User::new(
            "not-an-email",
            "Worker",
            "hash".to_string(),
            RoleId::new(),
            Utc::now(),
        );
        assert!(matches!(result, Err(AuthError::Validation(_))));
    }

    #[test]
    fn lock_window_is_time_boxed() {
        let now = Utc::now();
        let mut u = user();
        assert!(!u.is_locked(now));

        u.lock_until = Some(now + Duration::minutes(15));
        assert!(u.is_locked(now));
        assert!(!u.is_locked(now + Duration::minutes(16)));
    }

    #[test]
    fn password_hash_never_serializes() {
        let u = user();
        let json = serde_json::to_value(&u).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("email").is_some());
    }

    #[test]
    fn role_ref_deserializes_from_bare_id_and_object() {
        let role_id = RoleId::new();
        let bare: RoleRef = serde_json::from_value(serde_json::json!(role_id.to_string())).unwrap();
        assert_eq!(bare, RoleRef::Unresolved(role_id));
        assert!(bare.as_resolved().is_none());

        let role = Role::new("Manager", vec![], 50, Utc::now()).unwrap();
        let expanded: RoleRef =
            serde_json::from_value(serde_json::to_value(&role).unwrap()).unwrap();
        assert_eq!(expanded.role_id(), role.id);
        assert!(expanded.as_resolved().is_some());
    }
}
