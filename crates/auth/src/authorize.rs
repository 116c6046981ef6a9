//! Pure authorization checks over a resolved session.
//!
//! - No IO
//! - No panics
//! - No repair logic (resolution happened before these run)

use crate::error::AuthError;
use crate::permission::Permission;

/// Require one permission, matched by derived name or by identity.
pub fn check_permission(granted: &[Permission], needle: &str) -> Result<(), AuthError> {
    if granted.iter().any(|p| p.matches(needle)) {
        Ok(())
    } else {
        Err(AuthError::missing_permission(needle))
    }
}

/// Require the resolved role's name to be one of the allowed names.
pub fn check_role(role_name: &str, allowed: &[&str]) -> Result<(), AuthError> {
    if allowed.iter().any(|a| *a == role_name) {
        Ok(())
    } else {
        Err(AuthError::forbidden(format!(
            "role '{role_name}' is not permitted for this route"
        )))
    }
}
