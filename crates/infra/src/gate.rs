//! Authentication gate: credential validation, lockout, token issuance.

use std::sync::Arc;

use millworks_auth::{password, AuthError, LockState, LockoutPolicy, TokenService, User};
use millworks_core::{Clock, UserId};

use crate::store::UserStore;

/// Successful login payload: the bearer token plus the authenticated user.
/// The user's password hash never serializes, so this is safe to return
/// directly from the login endpoint.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

/// Validates credentials, manages failed-attempt lockout and issues tokens.
pub struct AuthenticationGate {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
    policy: LockoutPolicy,
    min_password_len: usize,
    clock: Arc<dyn Clock>,
}

impl AuthenticationGate {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: TokenService,
        policy: LockoutPolicy,
        min_password_len: usize,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            tokens,
            policy,
            min_password_len,
            clock,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Run one login attempt through the account state machine.
    ///
    /// An unknown email and a wrong password both return
    /// [`AuthError::InvalidCredentials`]; the caller cannot distinguish them.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let now = self.clock.now();

        let Some(mut user) = self.users.find_by_email(email).await? else {
            tracing::warn!(email, "login attempt for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        // Deactivated and locked accounts are rejected before the password is
        // compared, and without touching the attempt counter.
        self.policy.gate(&user, now)?;

        let password_ok = password::verify_password(&user.password_hash, password)
            .map_err(|e| AuthError::store(format!("stored password hash unusable: {e}")))?;

        if !password_ok {
            let state = self.policy.register_failure(&mut user, now);
            self.users.save(&user).await?;

            match state {
                LockState::Locked { until } => {
                    tracing::warn!(
                        user_id = %user.id,
                        attempts = user.login_attempts,
                        lock_until = %until,
                        "account locked after repeated failed logins"
                    );
                }
                LockState::Active => {
                    tracing::warn!(
                        user_id = %user.id,
                        attempts = user.login_attempts,
                        "failed login attempt"
                    );
                }
            }
            return Err(AuthError::InvalidCredentials);
        }

        if self.policy.register_success(&mut user) {
            self.users.save(&user).await?;
        }

        let token = self.tokens.issue(user.id, now)?;
        tracing::info!(user_id = %user.id, email = %user.email, "user logged in");

        Ok(LoginOutcome { token, user })
    }

    /// Rotate a password after re-verifying the current one.
    ///
    /// Returns a fresh token. Previously issued tokens stay valid until they
    /// expire: there is no revocation list, only new issuance.
    pub async fn change_password(
        &self,
        user_id: UserId,
        current: &str,
        next: &str,
    ) -> Result<String, AuthError> {
        let Some(mut user) = self.users.find_by_id(user_id).await? else {
            return Err(AuthError::SessionInvalid);
        };

        let current_ok = password::verify_password(&user.password_hash, current)
            .map_err(|e| AuthError::store(format!("stored password hash unusable: {e}")))?;
        if !current_ok {
            tracing::warn!(user_id = %user.id, "password change rejected: wrong current password");
            return Err(AuthError::InvalidCredentials);
        }

        if next.len() < self.min_password_len {
            return Err(AuthError::validation(format!(
                "password must be at least {} characters",
                self.min_password_len
            )));
        }

        user.password_hash = password::hash_password(next)
            .map_err(|e| AuthError::store(format!("password hashing failed: {e}")))?;
        self.users.save(&user).await?;

        tracing::info!(user_id = %user.id, "password changed");
        self.tokens.issue(user.id, self.clock.now())
    }
}
