//! Redis ephemeral store implementation.
//!
//! Every command runs under the client's operation timeout. Timeouts and
//! command failures surface as `StoreUnavailable` so callers fail closed.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, RedisResult};
use tracing::{debug, warn};

use bookpath_core::error::{AppError, ErrorKind};
use bookpath_core::result::AppResult;
use bookpath_core::traits::CacheProvider;

use super::client::RedisClient;

/// INCR and, only when the key has no expiry yet, PEXPIRE.
///
/// Running both in one script keeps the window fixed from the first failure
/// and leaves no counter without a TTL.
const INCR_WITH_TTL_SCRIPT: &str = r#"
local count = redis.call('INCR', KEYS[1])
if redis.call('PTTL', KEYS[1]) < 0 then
    redis.call('PEXPIRE', KEYS[1], ARGV[1])
end
return count
"#;

/// Keys deleted per SCAN page during `flush_all`.
const SCAN_PAGE: u32 = 500;

/// Redis-backed ephemeral store.
#[derive(Debug, Clone)]
pub struct RedisCacheProvider {
    client: RedisClient,
}

impl RedisCacheProvider {
    /// Create a new Redis provider.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    async fn timed<T, F>(&self, op: &'static str, fut: F) -> AppResult<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.client.operation_timeout(), fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!(op, error = %e, "Redis command failed");
                Err(AppError::with_source(
                    ErrorKind::StoreUnavailable,
                    format!("Redis {op} failed"),
                    e,
                ))
            }
            Err(_) => {
                warn!(op, "Redis command timed out");
                Err(AppError::store_unavailable(format!("Redis {op} timed out")))
            }
        }
    }
}

/// Redis `SET EX` needs whole seconds; round sub-second TTLs up.
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        self.timed("GET", conn.get(&full_key)).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        self.timed("SETEX", conn.set_ex(&full_key, value, ttl_secs(ttl)))
            .await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        self.timed("DEL", conn.del(&full_key)).await
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        self.timed("EXISTS", conn.exists(&full_key)).await
    }

    async fn incr_with_ttl(&self, key: &str, ttl: Duration) -> AppResult<i64> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let ttl_ms = ttl.as_millis().max(1) as u64;

        let count: i64 = self
            .timed(
                "INCR",
                redis::Script::new(INCR_WITH_TTL_SCRIPT)
                    .key(&full_key)
                    .arg(ttl_ms)
                    .invoke_async(&mut conn),
            )
            .await?;

        debug!(key = %full_key, count, "Counter incremented");
        Ok(count)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let pong: String = self
            .timed("PING", redis::cmd("PING").query_async(&mut conn))
            .await?;
        Ok(pong == "PONG")
    }

    async fn flush_all(&self) -> AppResult<()> {
        // Only keys under our prefix; the Redis instance may be shared.
        let pattern = self.client.prefixed_key("*");
        let mut conn = self.client.conn_mut();
        let mut cursor: u64 = 0;
        let mut removed = 0usize;

        loop {
            let (next, keys): (u64, Vec<String>) = self
                .timed(
                    "SCAN",
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(&pattern)
                        .arg("COUNT")
                        .arg(SCAN_PAGE)
                        .query_async(&mut conn),
                )
                .await?;

            if !keys.is_empty() {
                removed += keys.len();
                let _: () = self.timed("DEL", conn.del(&keys)).await?;
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!(pattern = %pattern, removed, "Flushed prefixed keys");
        Ok(())
    }
}
