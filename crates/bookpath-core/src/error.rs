//! Unified application error types for BookPath.
//!
//! Every crate maps its internal failures into [`AppError`] so that the route
//! layer receives one typed outcome per request. Authentication and
//! authorization failures are expected results, never panics.

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Error categorization shared by every BookPath crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// Email/password pair did not match a principal.
    InvalidCredentials,
    /// The principal is locked out until a known instant.
    AccountLocked,
    /// The token's `exp` claim is in the past.
    TokenExpired,
    /// The token's `jti` is present in the revocation store.
    TokenRevoked,
    /// The token was minted for an older token version.
    TokenStale,
    /// The token's subject no longer exists.
    PrincipalNotFound,
    /// The principal's role is not allowed for the operation.
    InsufficientRole,
    /// The principal's subscription tier is not allowed for the operation.
    SubscriptionRequired,
    /// A password failed the complexity or reuse policy.
    PolicyViolation,
    /// The credential or ephemeral store could not be reached in time.
    StoreUnavailable,
    /// No credentials were presented, or they could not be parsed or verified.
    Unauthenticated,
    /// Input validation failed.
    Validation,
    /// The requested resource was not found.
    NotFound,
    /// A uniqueness or concurrent-modification conflict.
    Conflict,
    /// An internal server error occurred.
    Internal,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
}

impl ErrorKind {
    /// Machine-readable reason code surfaced to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountLocked => "ACCOUNT_LOCKED",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenRevoked => "TOKEN_REVOKED",
            Self::TokenStale => "TOKEN_STALE",
            Self::PrincipalNotFound => "PRINCIPAL_NOT_FOUND",
            Self::InsufficientRole => "INSUFFICIENT_ROLE",
            Self::SubscriptionRequired => "SUBSCRIPTION_REQUIRED",
            Self::PolicyViolation => "POLICY_VIOLATION",
            Self::StoreUnavailable => "STORE_UNAVAILABLE",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Validation => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::Internal => "INTERNAL_ERROR",
            Self::Configuration => "CONFIGURATION_ERROR",
            Self::Serialization => "SERIALIZATION_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The unified application error used throughout BookPath.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Unlock instant carried by [`ErrorKind::AccountLocked`].
    pub unlock_at: Option<DateTime<Utc>>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            unlock_at: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            unlock_at: None,
            source: Some(Box::new(source)),
        }
    }

    /// Generic credential failure. Unknown emails use the same message.
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorKind::InvalidCredentials, "Incorrect email or password")
    }

    /// Lockout error carrying the instant the lock lifts.
    pub fn account_locked(unlock_at: DateTime<Utc>) -> Self {
        Self {
            kind: ErrorKind::AccountLocked,
            message: format!(
                "Account is locked until {}",
                unlock_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            unlock_at: Some(unlock_at),
            source: None,
        }
    }

    /// Create a token-expired error.
    pub fn token_expired() -> Self {
        Self::new(ErrorKind::TokenExpired, "Token has expired")
    }

    /// Create a token-revoked error.
    pub fn token_revoked() -> Self {
        Self::new(ErrorKind::TokenRevoked, "Token has been revoked")
    }

    /// Create a stale-token error.
    pub fn token_stale() -> Self {
        Self::new(
            ErrorKind::TokenStale,
            "Token is outdated; please sign in again",
        )
    }

    /// Create a principal-not-found error.
    pub fn principal_not_found() -> Self {
        Self::new(ErrorKind::PrincipalNotFound, "User no longer exists")
    }

    /// Create an insufficient-role error.
    pub fn insufficient_role(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InsufficientRole, message)
    }

    /// Create a subscription-required error.
    pub fn subscription_required(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SubscriptionRequired, message)
    }

    /// Create a password policy error.
    pub fn policy_violation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PolicyViolation, message)
    }

    /// Create a store-unavailable error.
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StoreUnavailable, message)
    }

    /// Create an unauthenticated error.
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthenticated, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Only store outages may be retried by the caller; everything else is
    /// terminal for the current request.
    pub fn is_retryable(&self) -> bool {
        self.kind == ErrorKind::StoreUnavailable
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            unlock_at: self.unlock_at,
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Internal, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
