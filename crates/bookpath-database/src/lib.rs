//! # bookpath-database
//!
//! PostgreSQL connection management, the [`CredentialStore`] abstraction
//! over principal records, and its PostgreSQL and in-memory implementations.

pub mod connection;
pub mod error;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryUserRepository;
pub use repositories::UserRepository;
pub use store::CredentialStore;
