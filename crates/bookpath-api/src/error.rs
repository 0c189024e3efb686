//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bookpath_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// When a locked account unlocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlock_at: Option<DateTime<Utc>>,
}

/// HTTP wrapper around [`AppError`].
///
/// Handlers return `Result<_, ApiError>` and use `?` on `AppResult` values.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

/// HTTP status for each error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidCredentials
        | ErrorKind::TokenExpired
        | ErrorKind::TokenRevoked
        | ErrorKind::TokenStale
        | ErrorKind::PrincipalNotFound
        | ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorKind::InsufficientRole => StatusCode::FORBIDDEN,
        ErrorKind::SubscriptionRequired => StatusCode::PAYMENT_REQUIRED,
        ErrorKind::AccountLocked => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::PolicyViolation | ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Internal | ErrorKind::Configuration | ErrorKind::Serialization => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Whole seconds until `until`, rounded up, never below one.
fn retry_after_seconds(until: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (until - now).num_milliseconds();
    ((millis + 999) / 1000).max(1)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = status_for(err.kind);

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %err, source = ?err.source, "Internal server error");
            "Internal server error".to_string()
        } else {
            if err.kind == ErrorKind::StoreUnavailable {
                tracing::warn!(error = %err.message, "Store unavailable");
            }
            err.message
        };

        let body = ApiErrorResponse {
            error: err.kind.code().to_string(),
            message,
            unlock_at: err.unlock_at,
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(until) = err.unlock_at {
            let seconds = retry_after_seconds(until, Utc::now());
            if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}
