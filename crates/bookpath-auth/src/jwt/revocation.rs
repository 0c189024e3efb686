//! Per-token revocation markers in the ephemeral store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use bookpath_cache::keys;
use bookpath_cache::provider::CacheManager;
use bookpath_core::config::AuthConfig;
use bookpath_core::result::AppResult;
use bookpath_core::traits::CacheProvider;

use super::claims::Claims;

/// Revoked token ids, each kept only as long as the token could still verify.
///
/// Lookups propagate store failures; a token is never treated as live because
/// the store could not be asked.
#[derive(Debug, Clone)]
pub struct RevocationList {
    cache: Arc<CacheManager>,
    leeway_seconds: u64,
}

impl RevocationList {
    /// Creates a revocation list over the given store.
    ///
    /// Markers are kept for the decoder's `exp` leeway on top of the
    /// token's remaining lifetime.
    pub fn new(config: &AuthConfig, cache: Arc<CacheManager>) -> Self {
        Self {
            cache,
            leeway_seconds: config.jwt_leeway_seconds,
        }
    }

    /// Whether `jti` has been revoked.
    pub async fn is_revoked(&self, jti: Uuid) -> AppResult<bool> {
        self.cache.exists(&keys::revoked_token(&jti.to_string())).await
    }

    /// Revokes the token described by `claims`.
    pub async fn revoke(&self, claims: &Claims, now: DateTime<Utc>) -> AppResult<()> {
        let ttl = claims.revocation_ttl(now, self.leeway_seconds);
        self.cache
            .set(&keys::revoked_token(&claims.jti.to_string()), "1", ttl)
            .await?;
        info!(
            user_id = %claims.sub,
            jti = %claims.jti,
            ttl_secs = ttl.as_secs(),
            "Token revoked"
        );
        Ok(())
    }
}
