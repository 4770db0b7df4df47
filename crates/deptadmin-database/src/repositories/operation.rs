//! Operation log repository implementation.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use deptadmin_core::result::AppResult;
use deptadmin_core::types::UserId;
use deptadmin_entity::operation::{CreateOperationLog, OperationLog};

use super::{DEFAULT_STATEMENT_TIMEOUT, bounded};
use crate::store::OperationLogStore;

/// Repository for operation log entries. Entries are never updated.
#[derive(Debug, Clone)]
pub struct OperationLogRepository {
    pool: PgPool,
    timeout: Duration,
}

impl OperationLogRepository {
    /// Create a new operation log repository.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            timeout: DEFAULT_STATEMENT_TIMEOUT,
        }
    }

    /// Override the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl OperationLogStore for OperationLogRepository {
    async fn save_operation_log(&self, entry: &CreateOperationLog) -> AppResult<OperationLog> {
        bounded(
            self.timeout,
            "save operation log",
            sqlx::query_as::<_, OperationLog>(
                r#"
                INSERT INTO operation_logs (operator_id, description, ip)
                VALUES ($1, $2, $3)
                RETURNING *
                "#,
            )
            .bind(entry.operator_id)
            .bind(&entry.description)
            .bind(&entry.ip)
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn find_operation_logs_by_operator(
        &self,
        operator_id: UserId,
        on: Option<NaiveDate>,
    ) -> AppResult<Vec<OperationLog>> {
        bounded(
            self.timeout,
            "list operation logs",
            sqlx::query_as::<_, OperationLog>(
                r#"
                SELECT * FROM operation_logs
                WHERE operator_id = $1
                  AND ($2::date IS NULL OR ("timestamp" AT TIME ZONE 'UTC')::date = $2)
                ORDER BY "timestamp" DESC, id DESC
                "#,
            )
            .bind(operator_id)
            .bind(on)
            .fetch_all(&self.pool),
        )
        .await
    }
}
