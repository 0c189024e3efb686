//! Principal-related audit events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Security-relevant events for a principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UserEvent {
    /// A new principal registered.
    Registered {
        /// The user ID.
        user_id: Uuid,
        /// The username.
        username: String,
    },
    /// A principal signed in.
    LoggedIn {
        /// The user ID.
        user_id: Uuid,
    },
    /// A principal's password was changed.
    PasswordChanged {
        /// The user ID.
        user_id: Uuid,
        /// Token version after the change.
        token_version: i64,
    },
    /// A principal's account was locked due to failed login attempts.
    AccountLocked {
        /// The user ID.
        user_id: Uuid,
        /// Number of failed attempts.
        failed_attempts: i64,
        /// When the lock lifts.
        locked_until: DateTime<Utc>,
    },
    /// A single token was revoked.
    TokenRevoked {
        /// The user ID.
        user_id: Uuid,
        /// The revoked token ID.
        jti: Uuid,
    },
    /// Every outstanding token was invalidated by a version bump.
    SessionsRevoked {
        /// The user ID.
        user_id: Uuid,
        /// Token version after the bump.
        token_version: i64,
    },
}

impl UserEvent {
    /// The principal this event concerns.
    pub fn user_id(&self) -> Uuid {
        match self {
            Self::Registered { user_id, .. }
            | Self::LoggedIn { user_id }
            | Self::PasswordChanged { user_id, .. }
            | Self::AccountLocked { user_id, .. }
            | Self::TokenRevoked { user_id, .. }
            | Self::SessionsRevoked { user_id, .. } => *user_id,
        }
    }
}
