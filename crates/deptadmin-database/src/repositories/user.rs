//! User repository implementation.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use deptadmin_core::error::AppError;
use deptadmin_core::result::AppResult;
use deptadmin_core::types::UserId;
use deptadmin_entity::user::{CreateUser, User};

use super::{DEFAULT_STATEMENT_TIMEOUT, bounded};
use crate::store::UserStore;

/// Repository for user CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
    timeout: Duration,
}

impl UserRepository {
    /// Create a new user repository.
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
impl UserStore for UserRepository {
    async fn find_user_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        bounded(
            self.timeout,
            "find user by id",
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        bounded(
            self.timeout,
            "find user by username",
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn create_user(&self, data: &CreateUser) -> AppResult<User> {
        bounded(
            self.timeout,
            "create user",
            sqlx::query_as::<_, User>(
                r#"
                INSERT INTO users (username, name, email, password_hash, department_id, remark)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
                "#,
            )
            .bind(&data.username)
            .bind(&data.name)
            .bind(&data.email)
            .bind(&data.password_hash)
            .bind(data.department_id)
            .bind(&data.remark)
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn save_user(&self, user: &User) -> AppResult<()> {
        let result = bounded(
            self.timeout,
            "save user",
            sqlx::query(
                r#"
                UPDATE users
                SET username = $2, name = $3, email = $4, password_hash = $5,
                    department_id = $6, remark = $7, last_seen = $8
                WHERE id = $1
                "#,
            )
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.department_id)
            .bind(&user.remark)
            .bind(user.last_seen)
            .execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {} not found", user.id)));
        }
        Ok(())
    }

    async fn touch_last_seen(&self, id: UserId, at: DateTime<Utc>) -> AppResult<()> {
        let result = bounded(
            self.timeout,
            "touch user",
            sqlx::query("UPDATE users SET last_seen = $2 WHERE id = $1")
                .bind(id)
                .bind(at)
                .execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("User {id} not found")));
        }
        Ok(())
    }

    async fn delete_user(&self, id: UserId) -> AppResult<bool> {
        let pool = &self.pool;
        bounded(self.timeout, "delete user", async move {
            let mut tx = pool.begin().await?;
            sqlx::query("DELETE FROM operation_logs WHERE operator_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
            tx.commit().await?;
            Ok::<_, sqlx::Error>(deleted > 0)
        })
        .await
    }
}
