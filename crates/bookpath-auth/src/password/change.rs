//! Pure planning of a password change.
//!
//! The plan is computed without touching any store; the service then applies
//! the returned effects in order.

use chrono::{DateTime, Utc};

use bookpath_core::events::UserEvent;
use bookpath_entity::user::{CredentialUpdate, PasswordHistoryEntry, User};

/// A side effect produced by planning, applied by the service.
#[derive(Debug, Clone)]
pub enum AuthEffect {
    /// Persist hash, history, and version in one conditional write.
    CredentialWrite(CredentialUpdate),
    /// Record an audit event.
    Audit(UserEvent),
}

/// Outcome of [`plan_password_change`].
#[derive(Debug, Clone)]
pub struct PasswordChange {
    /// The principal as it will look once the effects are applied.
    pub user: User,
    /// Effects to apply, in order.
    pub effects: Vec<AuthEffect>,
}

/// Plans replacing `user`'s password with `new_hash`.
///
/// The current hash moves into history (oldest evicted beyond
/// `history_depth`) and the token version advances by exactly one.
pub fn plan_password_change(
    user: &User,
    new_hash: String,
    now: DateTime<Utc>,
    history_depth: usize,
) -> PasswordChange {
    let mut history = user.password_history.clone();
    history.push(
        PasswordHistoryEntry {
            hash: user.password_hash.clone(),
            changed_at: now,
        },
        history_depth,
    );

    let update = CredentialUpdate {
        user_id: user.id,
        expected_version: user.token_version,
        password_hash: new_hash,
        password_history: history,
        changed_at: now,
    };

    let mut next = user.clone();
    next.password_hash = update.password_hash.clone();
    next.password_history = update.password_history.clone();
    next.token_version = update.new_version();
    next.password_changed_at = Some(now);
    next.updated_at = now;

    let audit = UserEvent::PasswordChanged {
        user_id: user.id,
        token_version: next.token_version,
    };

    PasswordChange {
        user: next,
        effects: vec![AuthEffect::CredentialWrite(update), AuthEffect::Audit(audit)],
    }
}
