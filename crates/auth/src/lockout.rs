//! Failed-attempt lockout state machine.
//!
//! Per-user counters live on the [`User`] record itself and are persisted by
//! the caller after each transition. Updates are read-modify-write with
//! last-writer-wins semantics: a lost increment under concurrent failures
//! slightly weakens the lockout, it never locks a user who should be open.

use chrono::{DateTime, Duration, Utc};

use crate::error::AuthError;
use crate::user::User;

/// Lockout configuration.
#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    /// Failed attempts at which the account locks.
    pub max_attempts: u32,
    /// How long a lock lasts; it expires on its own, no manual unlock needed.
    pub lockout: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lockout: Duration::minutes(15),
        }
    }
}

/// Authentication-relevant account state at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Active,
    Locked { until: DateTime<Utc> },
}

impl LockoutPolicy {
    /// Pre-credential gate: deactivated and locked accounts are rejected
    /// before the password is even compared.
    pub fn gate(&self, user: &User, now: DateTime<Utc>) -> Result<(), AuthError> {
        if !user.is_active {
            return Err(AuthError::AccountDeactivated);
        }
        if let LockState::Locked { .. } = self.state(user, now) {
            return Err(AuthError::AccountLocked);
        }
        Ok(())
    }

    pub fn state(&self, user: &User, now: DateTime<Utc>) -> LockState {
        match user.lock_until {
            Some(until) if now < until => LockState::Locked { until },
            _ => LockState::Active,
        }
    }

    /// Record a failed attempt, locking when the updated count reaches the
    /// threshold. A previous, already-expired lock restarts the count.
    pub fn register_failure(&self, user: &mut User, now: DateTime<Utc>) -> LockState {
        let lock_expired = user.lock_until.is_some_and(|until| now >= until);
        if lock_expired {
            user.login_attempts = 1;
            user.lock_until = None;
        } else {
            user.login_attempts += 1;
        }

        if user.login_attempts >= self.max_attempts && user.lock_until.is_none() {
            user.lock_until = Some(now + self.lockout);
        }

        self.state(user, now)
    }

    /// Record a successful authentication. Returns `true` when counters were
    /// dirty and the record needs persisting.
    pub fn register_success(&self, user: &mut User) -> bool {
        if user.login_attempts > 0 || user.lock_until.is_some() {
            user.login_attempts = 0;
            user.lock_until = None;
            true
        } else {
            false
        }
    }
}
