//! In-memory credential store for development and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use bookpath_core::error::AppError;
use bookpath_core::result::AppResult;
use bookpath_entity::user::{CreateUser, CredentialUpdate, PasswordHistory, User};

use crate::store::CredentialStore;

/// Credential store backed by a process-local map.
///
/// Mirrors the PostgreSQL semantics: case-insensitive unique email, unique
/// username, and version-guarded credential updates. Can be switched into an
/// unavailable state to exercise fail-closed paths.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
    unavailable: AtomicBool,
}

impl MemoryUserRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage; every call fails with `StoreUnavailable` while set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Overwrite a stored record. Test fixtures use this to set role or tier.
    pub async fn put(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }

    /// Remove a record.
    pub async fn remove(&self, id: Uuid) -> Option<User> {
        self.users.write().await.remove(&id)
    }

    fn ensure_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::store_unavailable("Credential store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        self.ensure_available()?;
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.ensure_available()?;
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        self.ensure_available()?;
        let mut users = self.users.write().await;

        if users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&data.email))
        {
            return Err(AppError::conflict("Email already in use"));
        }
        if users.values().any(|u| u.username == data.username) {
            return Err(AppError::conflict("Username already taken"));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            email: data.email.clone(),
            username: data.username.clone(),
            password_hash: data.password_hash.clone(),
            password_history: PasswordHistory::new(),
            failed_login_attempts: 0,
            account_locked_until: None,
            token_version: 0,
            role: data.role,
            subscription_tier: data.subscription_tier,
            two_factor_enabled: false,
            two_factor_secret: None,
            password_changed_at: Some(now),
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_credentials(&self, update: &CredentialUpdate) -> AppResult<User> {
        self.ensure_available()?;
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&update.user_id)
            .ok_or_else(|| AppError::not_found(format!("User {} not found", update.user_id)))?;

        if user.token_version != update.expected_version {
            return Err(AppError::conflict(
                "Credentials were changed concurrently; please retry",
            ));
        }

        user.password_hash = update.password_hash.clone();
        user.password_history = update.password_history.clone();
        user.token_version = update.new_version();
        user.password_changed_at = Some(update.changed_at);
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn bump_token_version(&self, id: Uuid) -> AppResult<i64> {
        self.ensure_available()?;
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        user.token_version += 1;
        user.updated_at = Utc::now();
        Ok(user.token_version)
    }

    async fn set_lock(
        &self,
        id: Uuid,
        failed_attempts: i32,
        locked_until: DateTime<Utc>,
    ) -> AppResult<()> {
        self.ensure_available()?;
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.failed_login_attempts = failed_attempts;
            user.account_locked_until = Some(locked_until);
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        self.ensure_available()?;
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.last_login_at = Some(at);
            user.failed_login_attempts = 0;
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(!self.unavailable.load(Ordering::SeqCst))
    }
}
