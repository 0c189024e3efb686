//! Credential store abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use bookpath_core::result::AppResult;
use bookpath_entity::user::{CreateUser, CredentialUpdate, User};

/// Durable access to principal records.
///
/// Implementations report unreachable backends as
/// `ErrorKind::StoreUnavailable` and uniqueness or version races as
/// `ErrorKind::Conflict`.
#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a principal by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a principal by email, ignoring case.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Insert a new principal with token version 0 and an empty history.
    async fn create(&self, data: &CreateUser) -> AppResult<User>;

    /// Apply a password change as one conditional write.
    ///
    /// Succeeds only while the stored token version equals
    /// `update.expected_version`; the hash, history, and incremented version
    /// are written together. Returns `Conflict` if the version moved on.
    async fn update_credentials(&self, update: &CredentialUpdate) -> AppResult<User>;

    /// Increment the token version and return the new value.
    async fn bump_token_version(&self, id: Uuid) -> AppResult<i64>;

    /// Record a lockout and the attempt count that triggered it.
    async fn set_lock(
        &self,
        id: Uuid,
        failed_attempts: i32,
        locked_until: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Stamp a successful login.
    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()>;

    /// Check that the store is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
