//! # bookpath-cache
//!
//! Ephemeral store providers for BookPath's short-lived auth state
//! (login-attempt counters and revoked-token markers):
//!
//! - **memory**: in-process store using [moka](https://crates.io/crates/moka)
//!   and [dashmap](https://crates.io/crates/dashmap)
//! - **redis**: Redis-backed store using the [redis](https://crates.io/crates/redis) crate
//!
//! The provider is selected at runtime from `cache.provider`.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::CacheManager;
