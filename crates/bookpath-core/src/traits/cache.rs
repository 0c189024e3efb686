//! Ephemeral store trait for pluggable key/value backends.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for ephemeral key/value backends (Redis or in-memory).
///
/// Holds short-lived auth state: login-attempt counters and revoked-token
/// markers. Every entry carries a TTL so nothing accumulates unboundedly.
/// Implementations must report connectivity failures and timeouts as
/// [`ErrorKind::StoreUnavailable`](crate::error::ErrorKind::StoreUnavailable).
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key does not exist or has expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value with a TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Delete a key. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Check whether a key exists.
    async fn exists(&self, key: &str) -> AppResult<bool>;

    /// Atomically increment an integer counter and return the new value.
    ///
    /// The TTL is applied when the counter is created and is not extended by
    /// later increments, so the window is fixed from the first increment.
    async fn incr_with_ttl(&self, key: &str, ttl: Duration) -> AppResult<i64>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Remove every entry owned by this provider.
    async fn flush_all(&self) -> AppResult<()>;
}
