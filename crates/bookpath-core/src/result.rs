//! Convenience result type alias for BookPath.

use crate::error::AppError;

/// A specialized `Result` type for BookPath operations.
pub type AppResult<T> = Result<T, AppError>;
