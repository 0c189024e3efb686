//! Core traits defined in `bookpath-core` and implemented by other crates.

pub mod cache;

pub use cache::CacheProvider;
