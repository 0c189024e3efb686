//! Principal entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::history::PasswordHistory;
use super::role::UserRole;
use super::tier::SubscriptionTier;

/// A registered BookPath principal.
///
/// Secret fields are skipped during serialization; the hash, history, and
/// two-factor secret are write-only from the API surface.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique email address, compared case-insensitively.
    pub email: String,
    /// Unique display handle.
    pub username: String,
    /// Argon2id password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Retired password hashes, oldest first.
    #[serde(skip_serializing, default)]
    #[sqlx(json)]
    pub password_history: PasswordHistory,
    /// Attempt count recorded when the last lock was set. Informational only.
    pub failed_login_attempts: i32,
    /// Account locked until this time (if locked).
    pub account_locked_until: Option<DateTime<Utc>>,
    /// Monotonic token epoch; tokens carrying an older value are stale.
    pub token_version: i64,
    /// Role used by route guards.
    pub role: UserRole,
    /// Subscription level used by route guards.
    pub subscription_tier: SubscriptionTier,
    /// Whether two-factor authentication is enabled.
    pub two_factor_enabled: bool,
    /// Two-factor shared secret.
    #[serde(skip_serializing, default)]
    pub two_factor_secret: Option<String>,
    /// When the password was last changed.
    pub password_changed_at: Option<DateTime<Utc>>,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Returns the lock expiry if the account is locked at `now`.
    ///
    /// A past `account_locked_until` is treated as unlocked; there is no
    /// separate unlock step.
    pub fn locked_until_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.account_locked_until.filter(|until| now < *until)
    }

    /// Check if the account is locked at `now`.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until_at(now).is_some()
    }

    /// Check if the account is currently locked.
    pub fn is_locked(&self) -> bool {
        self.is_locked_at(Utc::now())
    }
}

/// Data required to create a new principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address.
    pub email: String,
    /// Desired username.
    pub username: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Assigned role.
    pub role: UserRole,
    /// Assigned subscription tier.
    pub subscription_tier: SubscriptionTier,
}

/// A password change, applied as one conditional write.
///
/// The store must apply it only while the record still carries
/// `expected_version`, and must set `token_version` to `expected_version + 1`
/// in the same write as the hash and history.
#[derive(Debug, Clone)]
pub struct CredentialUpdate {
    /// The principal being updated.
    pub user_id: Uuid,
    /// Token version the change was planned against.
    pub expected_version: i64,
    /// New Argon2id hash.
    pub password_hash: String,
    /// History including the retired hash.
    pub password_history: PasswordHistory,
    /// When the change happened.
    pub changed_at: DateTime<Utc>,
}

impl CredentialUpdate {
    /// Token version after the update is applied.
    pub fn new_version(&self) -> i64 {
        self.expected_version + 1
    }
}
