//! Authentication and authorization failures.

use thiserror::Error;

use deptadmin_core::error::{AppError, ErrorKind};
use deptadmin_core::types::DepartmentId;

/// Why a guarded request was turned away.
///
/// `Unauthenticated` and `Unauthorized` are always kept apart so that callers
/// can answer with distinct status signals.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing, invalid, expired or wrong-class token, or unknown principal.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Valid principal without the requested permission.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The stored permission set of a department could not be parsed.
    ///
    /// Treated as a denial.
    #[error("malformed permission data on department {department_id}: {reason}")]
    MalformedPermissionData {
        /// Department whose permissions failed to parse.
        department_id: DepartmentId,
        /// Parser message.
        reason: String,
    },

    /// The backing store failed while serving a critical read.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] AppError),

    /// A server-side fault unrelated to the caller's credentials.
    #[error("internal error: {0}")]
    Internal(#[source] AppError),
}

impl AuthError {
    /// Whether this failure is an authentication failure.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated(_))
    }

    /// Whether this failure denies an authenticated principal.
    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized(_) | Self::MalformedPermissionData { .. }
        )
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let kind = match &err {
            AuthError::Unauthenticated(_) => ErrorKind::Authentication,
            AuthError::Unauthorized(_) | AuthError::MalformedPermissionData { .. } => {
                ErrorKind::Authorization
            }
            AuthError::StoreUnavailable(_) => ErrorKind::ServiceUnavailable,
            AuthError::Internal(_) => ErrorKind::Internal,
        };
        let message = err.to_string();
        AppError::with_source(kind, message, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_kinds_stay_distinct() {
        let unauthenticated: AppError = AuthError::Unauthenticated("no token".into()).into();
        let unauthorized: AppError = AuthError::Unauthorized("dept:delete".into()).into();
        let malformed: AppError = AuthError::MalformedPermissionData {
            department_id: DepartmentId(3),
            reason: "expected a sequence".into(),
        }
        .into();

        assert_eq!(unauthenticated.kind, ErrorKind::Authentication);
        assert_eq!(unauthorized.kind, ErrorKind::Authorization);
        assert_eq!(malformed.kind, ErrorKind::Authorization);
    }

    #[test]
    fn test_store_failure_maps_to_unavailable() {
        let err: AppError = AuthError::StoreUnavailable(AppError::database("down")).into();
        assert_eq!(err.kind, ErrorKind::ServiceUnavailable);

        let err: AppError = AuthError::Internal(AppError::internal("signing failed")).into();
        assert_eq!(err.kind, ErrorKind::Internal);
    }
}
