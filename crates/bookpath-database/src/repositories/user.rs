//! PostgreSQL-backed credential store.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use bookpath_core::error::AppError;
use bookpath_core::result::AppResult;
use bookpath_entity::user::{CreateUser, CredentialUpdate, PasswordHistory, User};

use crate::error::timed;
use crate::store::CredentialStore;

/// Repository for principal records.
///
/// Every call runs under `operation_timeout`.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
    operation_timeout: Duration,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool, operation_timeout: Duration) -> Self {
        Self {
            pool,
            operation_timeout,
        }
    }
}

#[async_trait]
impl CredentialStore for UserRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let query = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool);
        timed("Failed to find user by id", self.operation_timeout, query).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let query =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
                .bind(email)
                .fetch_optional(&self.pool);
        timed("Failed to find user by email", self.operation_timeout, query).await
    }

    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let query = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, username, password_hash, password_history, \
                                role, subscription_tier, password_changed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW()) \
             RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(&data.email)
        .bind(&data.username)
        .bind(&data.password_hash)
        .bind(Json(PasswordHistory::new()))
        .bind(data.role)
        .bind(data.subscription_tier)
        .fetch_one(&self.pool);
        timed("Failed to create user", self.operation_timeout, query).await
    }

    async fn update_credentials(&self, update: &CredentialUpdate) -> AppResult<User> {
        let query = sqlx::query_as::<_, User>(
            "UPDATE users SET password_hash = $3, \
                              password_history = $4, \
                              token_version = token_version + 1, \
                              password_changed_at = $5, \
                              updated_at = NOW() \
             WHERE id = $1 AND token_version = $2 \
             RETURNING *",
        )
        .bind(update.user_id)
        .bind(update.expected_version)
        .bind(&update.password_hash)
        .bind(Json(&update.password_history))
        .bind(update.changed_at)
        .fetch_optional(&self.pool);

        timed("Failed to update credentials", self.operation_timeout, query)
            .await?
            .ok_or_else(|| {
                AppError::conflict("Credentials were changed concurrently; please retry")
            })
    }

    async fn bump_token_version(&self, id: Uuid) -> AppResult<i64> {
        let query = sqlx::query_scalar::<_, i64>(
            "UPDATE users SET token_version = token_version + 1, updated_at = NOW() \
             WHERE id = $1 RETURNING token_version",
        )
        .bind(id)
        .fetch_optional(&self.pool);

        timed("Failed to bump token version", self.operation_timeout, query)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    async fn set_lock(
        &self,
        id: Uuid,
        failed_attempts: i32,
        locked_until: DateTime<Utc>,
    ) -> AppResult<()> {
        let query = sqlx::query(
            "UPDATE users SET failed_login_attempts = $2, account_locked_until = $3, \
                              updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(failed_attempts)
        .bind(locked_until)
        .execute(&self.pool);
        timed("Failed to lock user", self.operation_timeout, query).await?;
        Ok(())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        let query = sqlx::query(
            "UPDATE users SET last_login_at = $2, failed_login_attempts = 0, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool);
        timed("Failed to record login", self.operation_timeout, query).await?;
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        let query = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&self.pool);
        timed(
            "Credential store health check failed",
            self.operation_timeout,
            query,
        )
        .await
        .map(|v| v == 1)
    }
}
