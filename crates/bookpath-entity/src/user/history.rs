//! Bounded password history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of previous password hashes retained per principal.
pub const MAX_PASSWORD_HISTORY: usize = bookpath_core::config::auth::MAX_PASSWORD_HISTORY_DEPTH;

/// A previous password hash and when it was replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHistoryEntry {
    /// Argon2 PHC string of the retired password.
    pub hash: String,
    /// When this password stopped being current.
    pub changed_at: DateTime<Utc>,
}

/// Previous password hashes, oldest first, never longer than its capacity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHistory(Vec<PasswordHistoryEntry>);

impl PasswordHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a retired hash, evicting the oldest entries beyond `capacity`.
    pub fn push(&mut self, entry: PasswordHistoryEntry, capacity: usize) {
        self.0.push(entry);
        if self.0.len() > capacity {
            let excess = self.0.len() - capacity;
            self.0.drain(..excess);
        }
    }

    /// Iterates over retained hashes, oldest first.
    pub fn hashes(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|entry| entry.hash.as_str())
    }

    /// Entries, oldest first.
    pub fn entries(&self) -> &[PasswordHistoryEntry] {
        &self.0
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no hashes are retained.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
