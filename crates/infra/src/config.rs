//! Authentication/authorization configuration.

use chrono::Duration;

use millworks_auth::{LockoutPolicy, TokenService};

/// Tunables for the authorization subsystem, loaded from the environment with
/// development defaults.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret.
    pub jwt_secret: String,
    /// Bearer token lifetime.
    pub token_ttl: Duration,
    /// Failed-attempt threshold and lock window.
    pub lockout: LockoutPolicy,
    /// Minimum accepted password length.
    pub min_password_len: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "insecure-dev-secret".to_string(),
            token_ttl: Duration::hours(millworks_auth::token::DEFAULT_TOKEN_TTL_HOURS),
            lockout: LockoutPolicy::default(),
            min_password_len: 8,
        }
    }
}

impl AuthConfig {
    /// Read configuration from the environment, falling back to development
    /// defaults with a warning.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let jwt_secret = std::env::var("MILLWORKS_JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("MILLWORKS_JWT_SECRET not set; using insecure dev default");
            defaults.jwt_secret.clone()
        });

        let token_ttl = env_i64("MILLWORKS_TOKEN_TTL_HOURS")
            .map(Duration::hours)
            .unwrap_or(defaults.token_ttl);

        let lockout = LockoutPolicy {
            max_attempts: env_i64("MILLWORKS_MAX_LOGIN_ATTEMPTS")
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(defaults.lockout.max_attempts),
            lockout: env_i64("MILLWORKS_LOCKOUT_MINUTES")
                .map(Duration::minutes)
                .unwrap_or(defaults.lockout.lockout),
        };

        let min_password_len = env_i64("MILLWORKS_MIN_PASSWORD_LEN")
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(defaults.min_password_len);

        Self {
            jwt_secret,
            token_ttl,
            lockout,
            min_password_len,
        }
    }

    pub fn token_service(&self) -> TokenService {
        TokenService::new(self.jwt_secret.as_bytes(), self.token_ttl)
    }
}

fn env_i64(key: &str) -> Option<i64> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}
