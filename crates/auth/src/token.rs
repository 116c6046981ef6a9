//! Signed, time-limited bearer tokens.
//!
//! The token binds exactly one claim — the user identifier. Roles and
//! permissions are deliberately *not* baked into the token: they are resolved
//! live on every request, so an admin revoking a role takes effect without
//! waiting out token expiry.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use millworks_core::UserId;

use crate::error::AuthError;

/// Default token lifetime.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Claims carried by an issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User identifier (subject), the token's sole payload claim.
    pub sub: UserId,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// Issues and verifies HS256 bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn with_default_ttl(secret: &[u8]) -> Self {
        Self::new(secret, Duration::hours(DEFAULT_TOKEN_TTL_HOURS))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for a user, expiring `ttl` after `now`.
    pub fn issue(&self, user_id: UserId, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::store(format!("token signing failed: {e}")))
    }

    /// Verify a token and return its user identifier.
    ///
    /// Malformed, expired and mis-signed tokens all fail with the same
    /// [`AuthError::InvalidToken`]; callers get no signal about which.
    pub fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["sub", "exp", "iat"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims.sub)
            .map_err(|e| {
                tracing::debug!(error = %e, "token verification failed");
                AuthError::InvalidToken
            })
    }

    /// Pull the raw token out of an `Authorization` header value.
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
    }
}
