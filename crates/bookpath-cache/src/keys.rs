//! Key builders for ephemeral auth state.
//!
//! Backend-specific prefixes (such as the Redis `key_prefix`) are applied by
//! the provider, not here.

use chrono::NaiveDate;
use uuid::Uuid;

/// Failed-login counter for a principal on a UTC calendar day.
pub fn login_attempts(user_id: Uuid, day: NaiveDate) -> String {
    format!("login_attempts:{user_id}:{}", day.format("%Y-%m-%d"))
}

/// Revocation marker for a token id.
pub fn revoked_token(jti: &str) -> String {
    format!("jwt:revoked:{jti}")
}
