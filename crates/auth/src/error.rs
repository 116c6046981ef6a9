//! Authorization error taxonomy.

use thiserror::Error;

/// Result type used across the authorization subsystem.
pub type AuthResult<T> = Result<T, AuthError>;

/// Failure taxonomy for authentication and authorization.
///
/// Variants are deliberately coarse on the credential path: an unknown email
/// and a wrong password both surface as [`AuthError::InvalidCredentials`], so
/// the response never reveals which half was wrong.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Malformed or policy-violating input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A unique constraint was violated.
    #[error("duplicate value for field '{field}'")]
    DuplicateKey { field: &'static str },

    /// A supplied reference does not resolve to a usable record.
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// Email/password pair did not authenticate.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists but has been deactivated.
    #[error("account is deactivated")]
    AccountDeactivated,

    /// The account is inside a failed-attempt lock window.
    #[error("account temporarily locked due to repeated failed login attempts")]
    AccountLocked,

    /// Bearer token failed verification (malformed, expired or mis-signed;
    /// deliberately undifferentiated).
    #[error("invalid or expired token")]
    InvalidToken,

    /// The token verified but its user can no longer be vouched for.
    #[error("session is no longer valid")]
    SessionInvalid,

    /// The session's user carries no role reference at all.
    #[error("user has no role assigned")]
    RoleMissing,

    /// The session's role reference does not resolve to a stored role.
    #[error("assigned role no longer exists")]
    RoleNotFound,

    /// No credentials were presented on a protected route.
    #[error("not authorized to access this route")]
    Unauthenticated,

    /// Authenticated, but the resolved role/permission set is insufficient.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A referential-integrity precondition blocked the operation.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Unexpected failure in the backing store (or another collaborator).
    #[error("store failure: {0}")]
    Store(String),
}

impl AuthError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_reference(msg: impl Into<String>) -> Self {
        Self::InvalidReference(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Forbidden because a specific permission is missing. The permission name
    /// is part of the contract: clients display it.
    pub fn missing_permission(name: &str) -> Self {
        Self::Forbidden(format!("missing permission '{name}'"))
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}
