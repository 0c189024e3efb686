//! Password policy enforcement for new passwords.

use bookpath_core::config::AuthConfig;
use bookpath_core::error::AppError;
use bookpath_core::result::AppResult;
use bookpath_entity::user::User;

use super::hasher::PasswordHasher;

/// Validates new passwords against complexity and reuse rules.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
    min_strength: Option<u8>,
    history_depth: usize,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            min_strength: config.password_min_strength,
            history_depth: config.password_history_depth,
        }
    }

    /// Checks length and character classes, failing on the first violation.
    ///
    /// `user_inputs` (email, username) are fed to the strength estimator so
    /// that passwords derived from them score low.
    pub fn validate_complexity(&self, password: &str, user_inputs: &[&str]) -> AppResult<()> {
        if password.chars().count() < self.min_length {
            return Err(AppError::policy_violation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        if !password.chars().any(char::is_lowercase) {
            return Err(AppError::policy_violation(
                "Password must contain at least one lowercase letter",
            ));
        }

        if !password.chars().any(char::is_uppercase) {
            return Err(AppError::policy_violation(
                "Password must contain at least one uppercase letter",
            ));
        }

        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AppError::policy_violation(
                "Password must contain at least one digit",
            ));
        }

        if !password.chars().any(|c| !c.is_alphanumeric()) {
            return Err(AppError::policy_violation(
                "Password must contain at least one special character",
            ));
        }

        if let Some(min) = self.min_strength {
            let estimate = zxcvbn::zxcvbn(password, user_inputs);
            if (estimate.score() as u8) < min {
                return Err(AppError::policy_violation(
                    "Password is too easy to guess. Please choose a less predictable password.",
                ));
            }
        }

        Ok(())
    }

    /// Whether `password` matches the current hash or any retained history entry.
    ///
    /// Only the most recent `history_depth` entries are consulted.
    pub fn is_reused(&self, hasher: &PasswordHasher, password: &str, user: &User) -> AppResult<bool> {
        let entries = user.password_history.entries();
        let recent = &entries[entries.len().saturating_sub(self.history_depth)..];

        let candidates = std::iter::once(user.password_hash.as_str())
            .chain(recent.iter().map(|e| e.hash.as_str()));
        hasher.matches_any(password, candidates)
    }

    /// Fails with `PolicyViolation` if the password was used recently.
    pub fn ensure_not_reused(
        &self,
        hasher: &PasswordHasher,
        password: &str,
        user: &User,
    ) -> AppResult<()> {
        if self.is_reused(hasher, password, user)? {
            return Err(AppError::policy_violation(format!(
                "Password must differ from the current password and the last {} passwords",
                self.history_depth
            )));
        }
        Ok(())
    }

    /// Number of history entries retained per principal.
    pub fn history_depth(&self) -> usize {
        self.history_depth
    }
}
