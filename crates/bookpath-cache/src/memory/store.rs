//! In-memory ephemeral store using moka and dashmap.
//!
//! Values live in a moka cache with per-entry expiry. Counters live in a
//! dashmap so that an increment is a single locked update of one shard.
//! Neither evicts live entries; an entry leaves only when its TTL runs out.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use moka::Expiry;
use moka::future::Cache;
use tracing::debug;

use bookpath_core::config::cache::MemoryCacheConfig;
use bookpath_core::result::AppResult;
use bookpath_core::traits::CacheProvider;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

/// Expires each value after the TTL it was written with.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Entry, _at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _at: Instant,
        _remaining: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

#[derive(Debug, Clone, Copy)]
struct Counter {
    value: i64,
    expires_at: Instant,
}

impl Counter {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// In-process ephemeral store for development and tests.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    values: Cache<String, Entry>,
    counters: Arc<DashMap<String, Counter>>,
    max_entries: u64,
}

impl MemoryCacheProvider {
    /// Create a new store. Once `max_capacity` entries are held, expired
    /// ones are swept before each write.
    pub fn new(config: &MemoryCacheConfig) -> Self {
        let values = Cache::builder().expire_after(PerEntryTtl).build();

        Self {
            values,
            counters: Arc::new(DashMap::new()),
            max_entries: config.max_capacity,
        }
    }

    fn live_counter(&self, key: &str) -> Option<i64> {
        let now = Instant::now();
        self.counters
            .get(key)
            .filter(|c| c.is_live(now))
            .map(|c| c.value)
    }

    fn purge_expired_counters(&self) {
        let now = Instant::now();
        let before = self.counters.len();
        self.counters.retain(|_, c| c.is_live(now));
        debug!(
            purged = before - self.counters.len(),
            "Purged expired counters"
        );
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        if let Some(entry) = self.values.get(key).await {
            return Ok(Some(entry.value));
        }
        Ok(self.live_counter(key).map(|v| v.to_string()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        if self.values.entry_count() >= self.max_entries {
            self.values.run_pending_tasks().await;
            debug!(entries = self.values.entry_count(), "Swept expired values");
        }
        self.values
            .insert(
                key.to_string(),
                Entry {
                    value: value.to_string(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.values.remove(key).await;
        self.counters.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.values.contains_key(key) || self.live_counter(key).is_some())
    }

    async fn incr_with_ttl(&self, key: &str, ttl: Duration) -> AppResult<i64> {
        if self.counters.len() as u64 >= self.max_entries {
            self.purge_expired_counters();
        }

        let now = Instant::now();
        let fresh = Counter {
            value: 0,
            expires_at: now + ttl,
        };
        let mut counter = self.counters.entry(key.to_string()).or_insert(fresh);
        if !counter.is_live(now) {
            *counter = fresh;
        }
        counter.value += 1;
        Ok(counter.value)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn flush_all(&self) -> AppResult<()> {
        self.values.invalidate_all();
        self.counters.clear();
        Ok(())
    }
}
