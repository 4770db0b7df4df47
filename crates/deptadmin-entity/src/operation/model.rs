//! Operation log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use deptadmin_core::types::{OperationLogId, UserId};

/// An immutable record of an operation performed by a user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OperationLog {
    /// Unique entry identifier.
    pub id: OperationLogId,
    /// The user who performed the operation.
    pub operator_id: UserId,
    /// What was done.
    pub description: String,
    /// When it happened.
    pub timestamp: DateTime<Utc>,
    /// Caller IP address, when known.
    pub ip: Option<String>,
}

/// Data required to create a new operation log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOperationLog {
    /// The user who performed the operation.
    pub operator_id: UserId,
    /// What was done.
    pub description: String,
    /// Caller IP address.
    pub ip: Option<String>,
}
