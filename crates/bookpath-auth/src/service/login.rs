//! Login flow.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use bookpath_core::error::AppError;
use bookpath_core::events::{self, DomainEvent, UserEvent};
use bookpath_core::result::AppResult;
use bookpath_entity::user::User;

use super::AuthService;
use crate::attempts::FailureOutcome;
use crate::jwt::TokenPair;

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    /// Generated token pair.
    pub tokens: TokenPair,
    /// The authenticated user.
    pub user: User,
}

impl AuthService {
    /// Exchanges an email and password for a token pair.
    ///
    /// 1. Look up the principal; unknown emails burn a dummy verification
    ///    and fail exactly like a wrong password
    /// 2. Refuse a locked principal without checking the password
    /// 3. Verify the password; on mismatch count the failure, which may lock
    /// 4. On success clear the counter, stamp the login, and issue tokens
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginResult> {
        let now = Utc::now();

        let Some(user) = self.store.find_by_email(email).await? else {
            Arc::clone(&self.hasher)
                .dummy_verify_blocking(password.to_string())
                .await;
            info!("Login failed: unknown email");
            return Err(AppError::invalid_credentials());
        };

        if let Some(until) = user.locked_until_at(now) {
            warn!(user_id = %user.id, locked_until = %until, "Login refused: account locked");
            return Err(AppError::account_locked(until));
        }

        let valid = Arc::clone(&self.hasher)
            .verify_blocking(password.to_string(), user.password_hash.clone())
            .await?;

        if !valid {
            return match self.governor.record_failure(&user, now).await? {
                FailureOutcome::Counted { attempts } => {
                    info!(user_id = %user.id, attempts, "Login failed: wrong password");
                    Err(AppError::invalid_credentials())
                }
                FailureOutcome::LockTriggered { until } => Err(AppError::account_locked(until)),
            };
        }

        self.governor.clear(user.id, now).await?;
        self.store.record_login(user.id, now).await?;

        let tokens = self.encoder.issue_pair(&user)?;

        info!(user_id = %user.id, token_version = user.token_version, "Login successful");
        events::record(&DomainEvent::new(
            Some(user.id),
            UserEvent::LoggedIn { user_id: user.id },
        ));

        Ok(LoginResult { tokens, user })
    }
}
