//! Authentication configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Minimum secret length accepted outside development.
const MIN_SECRET_BYTES: usize = 32;

/// Lowest accepted `password_min_length`.
pub const MIN_PASSWORD_LENGTH: usize = 12;

/// Most retired password hashes a principal record can hold.
pub const MAX_PASSWORD_HISTORY_DEPTH: usize = 5;

/// Authentication, lockout, and password policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// `iss` claim stamped on and required from every token.
    #[serde(default = "default_issuer")]
    pub jwt_issuer: String,
    /// `aud` claim stamped on and required from every token.
    #[serde(default = "default_audience")]
    pub jwt_audience: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub jwt_access_ttl_minutes: u64,
    /// Refresh token TTL in hours.
    #[serde(default = "default_refresh_ttl")]
    pub jwt_refresh_ttl_hours: u64,
    /// Clock-skew leeway applied to `exp` checks, in seconds.
    #[serde(default = "default_leeway")]
    pub jwt_leeway_seconds: u64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Optional zxcvbn score (0-4) new passwords must reach.
    #[serde(default)]
    pub password_min_strength: Option<u8>,
    /// Number of previous password hashes retained for reuse checks.
    #[serde(default = "default_history_depth")]
    pub password_history_depth: usize,
    /// Failed attempts within the window that trigger a lockout.
    #[serde(default = "default_max_failed")]
    pub max_failed_attempts: u32,
    /// Account lockout duration in seconds.
    #[serde(default = "default_lockout")]
    pub lockout_duration_seconds: u64,
    /// Lifetime of the failed-attempt counter in seconds.
    #[serde(default = "default_attempt_window")]
    pub attempt_window_seconds: u64,
    /// Argon2id memory cost in KiB.
    #[serde(default = "default_argon2_memory")]
    pub argon2_memory_kib: u32,
    /// Argon2id iteration count.
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,
    /// Argon2id degree of parallelism.
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_issuer: default_issuer(),
            jwt_audience: default_audience(),
            jwt_access_ttl_minutes: default_access_ttl(),
            jwt_refresh_ttl_hours: default_refresh_ttl(),
            jwt_leeway_seconds: default_leeway(),
            password_min_length: default_password_min(),
            password_min_strength: None,
            password_history_depth: default_history_depth(),
            max_failed_attempts: default_max_failed(),
            lockout_duration_seconds: default_lockout(),
            attempt_window_seconds: default_attempt_window(),
            argon2_memory_kib: default_argon2_memory(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

impl AuthConfig {
    /// Checks value ranges once at startup.
    ///
    /// `strict_secret` rejects the placeholder secret and short secrets; it is
    /// relaxed only for the development environment.
    pub fn validate(&self, strict_secret: bool) -> Result<(), AppError> {
        if self.jwt_secret.is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must not be empty"));
        }
        if strict_secret
            && (self.jwt_secret == default_jwt_secret()
                || self.jwt_secret.len() < MIN_SECRET_BYTES)
        {
            return Err(AppError::configuration(format!(
                "auth.jwt_secret must be changed and at least {MIN_SECRET_BYTES} bytes long"
            )));
        }
        if self.jwt_issuer.is_empty() || self.jwt_audience.is_empty() {
            return Err(AppError::configuration(
                "auth.jwt_issuer and auth.jwt_audience must not be empty",
            ));
        }
        if self.jwt_access_ttl_minutes == 0 || self.jwt_refresh_ttl_hours == 0 {
            return Err(AppError::configuration("Token TTLs must be positive"));
        }
        if self.max_failed_attempts == 0 {
            return Err(AppError::configuration(
                "auth.max_failed_attempts must be at least 1",
            ));
        }
        if self.lockout_duration_seconds == 0 || self.attempt_window_seconds == 0 {
            return Err(AppError::configuration(
                "Lockout duration and attempt window must be positive",
            ));
        }
        if self.password_min_length < MIN_PASSWORD_LENGTH {
            return Err(AppError::configuration(format!(
                "auth.password_min_length must be at least {MIN_PASSWORD_LENGTH}"
            )));
        }
        if self.password_history_depth == 0
            || self.password_history_depth > MAX_PASSWORD_HISTORY_DEPTH
        {
            return Err(AppError::configuration(format!(
                "auth.password_history_depth must be between 1 and {MAX_PASSWORD_HISTORY_DEPTH}"
            )));
        }
        if let Some(score) = self.password_min_strength {
            if score > 4 {
                return Err(AppError::configuration(
                    "auth.password_min_strength must be between 0 and 4",
                ));
            }
        }
        Ok(())
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_issuer() -> String {
    "bookpath".to_string()
}

fn default_audience() -> String {
    "bookpath-clients".to_string()
}

fn default_access_ttl() -> u64 {
    60
}

fn default_refresh_ttl() -> u64 {
    24 * 7
}

fn default_leeway() -> u64 {
    5
}

fn default_password_min() -> usize {
    MIN_PASSWORD_LENGTH
}

fn default_history_depth() -> usize {
    MAX_PASSWORD_HISTORY_DEPTH
}

fn default_max_failed() -> u32 {
    5
}

fn default_lockout() -> u64 {
    120
}

fn default_attempt_window() -> u64 {
    24 * 60 * 60
}

fn default_argon2_memory() -> u32 {
    64 * 1024
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_pass_relaxed_validation() {
        assert!(AuthConfig::default().validate(false).is_ok());
    }

    #[test]
    fn test_placeholder_secret_rejected_when_strict() {
        assert!(AuthConfig::default().validate(true).is_err());

        let config = AuthConfig {
            jwt_secret: "x".repeat(48),
            ..AuthConfig::default()
        };
        assert!(config.validate(true).is_ok());
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let config = AuthConfig {
            max_failed_attempts: 0,
            ..AuthConfig::default()
        };
        assert!(config.validate(false).is_err());
    }

    #[test]
    fn test_short_password_minimum_rejected() {
        let config = AuthConfig {
            password_min_length: 6,
            ..AuthConfig::default()
        };
        assert!(config.validate(false).is_err());

        let config = AuthConfig {
            password_min_length: 16,
            ..AuthConfig::default()
        };
        assert!(config.validate(false).is_ok());
    }

    #[test]
    fn test_history_depth_bounded_by_record_capacity() {
        for depth in [0, MAX_PASSWORD_HISTORY_DEPTH + 1, 10] {
            let config = AuthConfig {
                password_history_depth: depth,
                ..AuthConfig::default()
            };
            assert!(config.validate(false).is_err(), "depth {depth} accepted");
        }

        let config = AuthConfig {
            password_history_depth: 3,
            ..AuthConfig::default()
        };
        assert!(config.validate(false).is_ok());
    }
}
