//! Convenience result type alias for DeptAdmin.

use crate::error::AppError;

/// A specialized `Result` type for DeptAdmin operations.
pub type AppResult<T> = Result<T, AppError>;
