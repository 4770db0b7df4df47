//! PostgreSQL repository implementations of the store traits.

pub mod department;
pub mod operation;
pub mod user;

pub use department::DepartmentRepository;
pub use operation::OperationLogRepository;
pub use user::UserRepository;

use std::future::Future;
use std::time::Duration;

use deptadmin_core::error::AppError;
use deptadmin_core::result::AppResult;

/// Per-call timeout used when a repository is built without one.
pub const DEFAULT_STATEMENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Run a database future under `limit`.
///
/// A hung call becomes a `ServiceUnavailable` error instead of a stuck request.
pub(crate) async fn bounded<T, F>(limit: Duration, what: &str, fut: F) -> AppResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            let err = AppError::from(e);
            Err(AppError {
                message: format!("Failed to {what}: {}", err.message),
                ..err
            })
        }
        Err(_) => {
            tracing::warn!(operation = what, timeout_ms = limit.as_millis() as u64, "Store call timed out");
            Err(AppError::service_unavailable(format!(
                "Timed out after {}ms trying to {what}",
                limit.as_millis()
            )))
        }
    }
}
