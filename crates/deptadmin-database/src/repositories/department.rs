//! Department repository implementation.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;

use deptadmin_core::error::AppError;
use deptadmin_core::result::AppResult;
use deptadmin_core::types::DepartmentId;
use deptadmin_entity::department::{CreateDepartment, Department};

use super::{DEFAULT_STATEMENT_TIMEOUT, bounded};
use crate::store::DepartmentStore;

/// Repository for department CRUD operations.
#[derive(Debug, Clone)]
pub struct DepartmentRepository {
    pool: PgPool,
    timeout: Duration,
}

impl DepartmentRepository {
    /// Create a new department repository.
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

    /// Find a department by its unique name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Department>> {
        bounded(
            self.timeout,
            "find department by name",
            sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool),
        )
        .await
    }
}

#[async_trait]
impl DepartmentStore for DepartmentRepository {
    async fn find_department_by_id(&self, id: DepartmentId) -> AppResult<Option<Department>> {
        bounded(
            self.timeout,
            "find department by id",
            sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn create_department(&self, data: &CreateDepartment) -> AppResult<Department> {
        let permissions = data.permissions.to_json()?;
        bounded(
            self.timeout,
            "create department",
            sqlx::query_as::<_, Department>(
                r#"
                INSERT INTO departments (name, description, active, permissions)
                VALUES ($1, $2, $3, $4)
                RETURNING *
                "#,
            )
            .bind(&data.name)
            .bind(&data.description)
            .bind(data.active)
            .bind(permissions)
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn update_department(&self, department: &Department) -> AppResult<()> {
        let result = bounded(
            self.timeout,
            "update department",
            sqlx::query(
                r#"
                UPDATE departments
                SET name = $2, description = $3, active = $4, permissions = $5
                WHERE id = $1
                "#,
            )
            .bind(department.id)
            .bind(&department.name)
            .bind(&department.description)
            .bind(department.active)
            .bind(&department.permissions)
            .execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Department {} not found",
                department.id
            )));
        }
        Ok(())
    }

    async fn delete_department(&self, id: DepartmentId) -> AppResult<bool> {
        let pool = &self.pool;
        bounded(self.timeout, "delete department", async move {
            let mut tx = pool.begin().await?;
            sqlx::query(
                "DELETE FROM operation_logs WHERE operator_id IN \
                 (SELECT id FROM users WHERE department_id = $1)",
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
            let members = sqlx::query("DELETE FROM users WHERE department_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            let deleted = sqlx::query("DELETE FROM departments WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            tx.commit().await?;
            if deleted > 0 {
                tracing::info!(department_id = %id, members, "Deleted department and its members");
            }
            Ok::<_, sqlx::Error>(deleted > 0)
        })
        .await
    }
}
