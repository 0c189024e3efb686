//! Mapping of `sqlx` failures onto [`AppError`].

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use bookpath_core::error::{AppError, ErrorKind};
use bookpath_core::result::AppResult;

/// PostgreSQL `query_canceled`, raised when `statement_timeout` fires.
const QUERY_CANCELED: &str = "57014";

/// Maps a `sqlx` error, failing closed on connectivity problems.
///
/// Pool exhaustion, I/O, TLS failures, and server-side cancellation mean the
/// credential store is unreachable and become [`ErrorKind::StoreUnavailable`].
/// Unique-key violations become [`ErrorKind::Conflict`].
pub fn map_sqlx(context: &str, err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::WorkerCrashed => AppError::with_source(
            ErrorKind::StoreUnavailable,
            format!("{context}: credential store unavailable"),
            err,
        ),
        sqlx::Error::Database(ref db_err)
            if db_err.code().as_deref() == Some(QUERY_CANCELED) =>
        {
            AppError::with_source(
                ErrorKind::StoreUnavailable,
                format!("{context}: credential store query cancelled"),
                err,
            )
        }
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            let message = match db_err.constraint() {
                Some("users_email_key") => "Email already in use".to_string(),
                Some("users_username_key") => "Username already taken".to_string(),
                _ => format!("{context}: duplicate value"),
            };
            AppError::with_source(ErrorKind::Conflict, message, err)
        }
        _ => AppError::with_source(ErrorKind::Internal, context.to_string(), err),
    }
}

/// Runs a store call under `limit`, mapping its error with [`map_sqlx`].
///
/// A call that outlives the deadline is abandoned and reported as
/// [`ErrorKind::StoreUnavailable`].
pub async fn timed<T, F>(context: &str, limit: Duration, fut: F) -> AppResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(|e| map_sqlx(context, e)),
        Err(_) => {
            warn!(
                context,
                timeout_ms = limit.as_millis() as u64,
                "Credential store call timed out"
            );
            Err(AppError::store_unavailable(format!(
                "{context}: credential store timed out"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_fails_closed() {
        let err = map_sqlx("Failed to find user", sqlx::Error::PoolTimedOut);
        assert_eq!(err.kind, ErrorKind::StoreUnavailable);
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_hung_call_times_out_as_unavailable() {
        let hung = std::future::pending::<Result<i32, sqlx::Error>>();
        let err = timed("Failed to find user", Duration::from_millis(20), hung)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::StoreUnavailable);
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_timed_passes_through_results() {
        let ok = timed("Lookup", Duration::from_secs(1), async { Ok::<_, sqlx::Error>(7) })
            .await
            .unwrap();
        assert_eq!(ok, 7);

        let err = timed("Lookup", Duration::from_secs(1), async {
            Err::<i32, _>(sqlx::Error::PoolTimedOut)
        })
        .await
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::StoreUnavailable);
    }

    #[test]
    fn test_row_not_found_is_internal() {
        let err = map_sqlx("Failed to load user", sqlx::Error::RowNotFound);
        assert_eq!(err.kind, ErrorKind::Internal);
    }
}
