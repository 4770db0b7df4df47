//! Store traits consumed by the auth core.
//!
//! Each request issues independent reads and writes through these traits;
//! there is no explicit locking. Concurrent `save_user` calls for the same
//! user are last-write-wins. Activity tracking goes through
//! `touch_last_seen`, which writes no other column.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use deptadmin_core::result::AppResult;
use deptadmin_core::types::{DepartmentId, UserId};
use deptadmin_entity::department::{CreateDepartment, Department};
use deptadmin_entity::operation::{CreateOperationLog, OperationLog};
use deptadmin_entity::user::{CreateUser, User};

/// Persistence of principals.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by primary key.
    async fn find_user_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Find a user by login name.
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Insert a new user and return the stored row.
    async fn create_user(&self, data: &CreateUser) -> AppResult<User>;

    /// Overwrite the mutable columns of an existing user.
    async fn save_user(&self, user: &User) -> AppResult<()>;

    /// Set `last_seen` on an existing user, leaving every other column as stored.
    async fn touch_last_seen(&self, id: UserId, at: DateTime<Utc>) -> AppResult<()>;

    /// Delete a user and the operation log entries it owns.
    ///
    /// Returns `false` if no such user existed.
    async fn delete_user(&self, id: UserId) -> AppResult<bool>;
}

/// Persistence of departments.
#[async_trait]
pub trait DepartmentStore: Send + Sync {
    /// Find a department by primary key.
    async fn find_department_by_id(&self, id: DepartmentId) -> AppResult<Option<Department>>;

    /// Insert a new department and return the stored row.
    async fn create_department(&self, data: &CreateDepartment) -> AppResult<Department>;

    /// Overwrite name, description, active flag and permissions.
    async fn update_department(&self, department: &Department) -> AppResult<()>;

    /// Delete a department together with its member users and their logs.
    ///
    /// Returns `false` if no such department existed.
    async fn delete_department(&self, id: DepartmentId) -> AppResult<bool>;
}

/// Write-mostly audit trail.
#[async_trait]
pub trait OperationLogStore: Send + Sync {
    /// Append an entry.
    async fn save_operation_log(&self, entry: &CreateOperationLog) -> AppResult<OperationLog>;

    /// Entries recorded for one operator, newest first.
    ///
    /// With `on` set, only entries whose UTC timestamp falls on that day.
    async fn find_operation_logs_by_operator(
        &self,
        operator_id: UserId,
        on: Option<NaiveDate>,
    ) -> AppResult<Vec<OperationLog>>;
}
