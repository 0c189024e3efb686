//! Login attempt governor.
//!
//! The per-day counter in the ephemeral store is authoritative. The
//! principal's `failed_login_attempts` column is written only when a lock is
//! set and is never read for decisions.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use bookpath_cache::keys;
use bookpath_cache::provider::CacheManager;
use bookpath_core::config::AuthConfig;
use bookpath_core::events::{self, DomainEvent, UserEvent};
use bookpath_core::result::AppResult;
use bookpath_core::traits::CacheProvider;
use bookpath_database::CredentialStore;
use bookpath_entity::user::User;

/// Lockout state of a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// No recorded failures.
    Open,
    /// Some failures recorded, below the threshold.
    Warning {
        /// Failures counted so far in the current window.
        attempts: u32,
    },
    /// Logins are refused until the given instant.
    Locked {
        /// When the lock lifts.
        until: DateTime<Utc>,
    },
}

/// Result of recording a failed credential check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// The failure was counted; the account is still open.
    Counted {
        /// Failures counted so far in the current window.
        attempts: u32,
    },
    /// This failure reached the threshold and locked the account.
    LockTriggered {
        /// When the lock lifts.
        until: DateTime<Utc>,
    },
}

/// Tracks failed logins and locks principals that cross the threshold.
#[derive(Debug, Clone)]
pub struct LoginAttemptGovernor {
    cache: Arc<CacheManager>,
    store: Arc<dyn CredentialStore>,
    max_attempts: u32,
    lockout: chrono::Duration,
    window: Duration,
}

impl LoginAttemptGovernor {
    /// Creates a governor using the configured threshold and durations.
    pub fn new(config: &AuthConfig, cache: Arc<CacheManager>, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            cache,
            store,
            max_attempts: config.max_failed_attempts,
            lockout: chrono::Duration::seconds(config.lockout_duration_seconds as i64),
            window: Duration::from_secs(config.attempt_window_seconds),
        }
    }

    /// Current lockout state of `user` at `now`.
    pub async fn state(&self, user: &User, now: DateTime<Utc>) -> AppResult<LockState> {
        if let Some(until) = user.locked_until_at(now) {
            return Ok(LockState::Locked { until });
        }

        let key = keys::login_attempts(user.id, now.date_naive());
        let attempts = self
            .cache
            .get(&key)
            .await?
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(0);

        Ok(match attempts {
            0 => LockState::Open,
            attempts => LockState::Warning { attempts },
        })
    }

    /// Counts a failed credential check, locking the account at the threshold.
    ///
    /// Reaching the threshold sets the lock on the principal and resets the
    /// counter, so the next window after the lock starts from zero.
    pub async fn record_failure(&self, user: &User, now: DateTime<Utc>) -> AppResult<FailureOutcome> {
        let key = keys::login_attempts(user.id, now.date_naive());
        let count = self.cache.incr_with_ttl(&key, self.window).await?;
        let attempts = u32::try_from(count).unwrap_or(u32::MAX);

        if attempts < self.max_attempts {
            debug!(
                user_id = %user.id,
                attempts,
                max_attempts = self.max_attempts,
                "Failed login counted"
            );
            return Ok(FailureOutcome::Counted { attempts });
        }

        let until = now + self.lockout;
        self.store
            .set_lock(user.id, attempts as i32, until)
            .await?;
        self.cache.delete(&key).await?;

        warn!(
            user_id = %user.id,
            attempts,
            locked_until = %until,
            "Account locked after repeated failed logins"
        );
        events::record(&DomainEvent::new(
            None,
            UserEvent::AccountLocked {
                user_id: user.id,
                failed_attempts: count,
                locked_until: until,
            },
        ));

        Ok(FailureOutcome::LockTriggered { until })
    }

    /// Drops the failure counter after a successful credential check.
    pub async fn clear(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<()> {
        self.cache
            .delete(&keys::login_attempts(user_id, now.date_naive()))
            .await?;
        info!(user_id = %user_id, "Failed login counter cleared");
        Ok(())
    }
}
