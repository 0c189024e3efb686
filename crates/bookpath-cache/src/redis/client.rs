//! Redis connection management.

use std::time::Duration;

use redis::Client;
use redis::aio::ConnectionManager;
use tracing::info;

use bookpath_core::config::cache::RedisCacheConfig;
use bookpath_core::error::{AppError, ErrorKind};
use bookpath_core::result::AppResult;

/// Reconnecting Redis handle with a key prefix and a per-command timeout.
#[derive(Clone)]
pub struct RedisClient {
    conn: ConnectionManager,
    key_prefix: String,
    operation_timeout: Duration,
}

impl std::fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisClient")
            .field("key_prefix", &self.key_prefix)
            .field("operation_timeout", &self.operation_timeout)
            .finish_non_exhaustive()
    }
}

impl RedisClient {
    /// Connect, giving up after `connect_timeout_ms`.
    pub async fn connect(config: &RedisCacheConfig) -> AppResult<Self> {
        info!(url = %mask_redis_url(&config.url), "Connecting to Redis");

        let client = Client::open(config.url.as_str()).map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Invalid Redis URL", e)
        })?;

        let connect_timeout = Duration::from_millis(config.connect_timeout_ms);
        let conn = tokio::time::timeout(connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| {
                AppError::store_unavailable(format!(
                    "Redis connect timed out after {}ms",
                    config.connect_timeout_ms
                ))
            })?
            .map_err(|e| {
                AppError::with_source(ErrorKind::StoreUnavailable, "Failed to connect to Redis", e)
            })?;

        info!("Successfully connected to Redis");
        Ok(Self {
            conn,
            key_prefix: config.key_prefix.clone(),
            operation_timeout: Duration::from_millis(config.operation_timeout_ms),
        })
    }

    /// A connection handle for one command sequence.
    pub fn conn_mut(&self) -> ConnectionManager {
        self.conn.clone()
    }

    /// Build a full key with the configured prefix.
    pub fn prefixed_key(&self, key: &str) -> String {
        format!("{}{key}", self.key_prefix)
    }

    /// Upper bound for any single command.
    pub fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }
}

/// Mask password in Redis URL for safe logging.
fn mask_redis_url(url: &str) -> String {
    let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
    match url.rfind('@') {
        Some(at) if at > scheme_end => format!("{}****@{}", &url[..scheme_end], &url[at + 1..]),
        _ => url.to_string(),
    }
}
