//! In-memory ephemeral store.

pub mod store;

pub use store::MemoryCacheProvider;
