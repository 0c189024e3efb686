//! JWT claims structure used in access and refresh tokens.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bookpath_entity::user::UserRole;

/// Claims carried by every BookPath token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the principal id.
    pub sub: Uuid,
    /// Principal's token version at issue time.
    pub ver: i64,
    /// Unique token id, the revocation handle.
    pub jti: Uuid,
    /// Role at issue time. Informational; guards use the loaded record.
    pub role: UserRole,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiry (seconds since epoch).
    pub exp: i64,
    /// Access or refresh.
    pub typ: TokenType,
}

/// Distinguishes access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived token presented on API requests.
    Access,
    /// Long-lived token exchanged for a new pair.
    Refresh,
}

impl Claims {
    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Time left at `now` until the token stops decoding, counting the
    /// `leeway_seconds` the decoder grants past `exp`. Never less than one
    /// second.
    ///
    /// Used as the TTL of a revocation marker so it outlives the token.
    pub fn revocation_ttl(&self, now: DateTime<Utc>, leeway_seconds: u64) -> Duration {
        let remaining = self.exp.saturating_add(leeway_seconds as i64) - now.timestamp();
        Duration::from_secs(remaining.max(1) as u64)
    }
}
