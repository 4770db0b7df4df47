//! In-process store backed by ordered maps.
//!
//! Mirrors the constraints of the PostgreSQL schema (unique usernames,
//! emails and department names, department foreign keys, cascading
//! deletes) so that tests and the CLI `check` command exercise the same
//! failure paths as the real database.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use deptadmin_core::error::AppError;
use deptadmin_core::result::AppResult;
use deptadmin_core::types::{DepartmentId, OperationLogId, UserId};
use deptadmin_entity::department::{CreateDepartment, Department};
use deptadmin_entity::operation::{CreateOperationLog, OperationLog};
use deptadmin_entity::user::{CreateUser, User};

use crate::store::{DepartmentStore, OperationLogStore, UserStore};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    departments: BTreeMap<DepartmentId, Department>,
    logs: Vec<OperationLog>,
    next_user: i64,
    next_department: i64,
    next_log: i64,
}

impl Tables {
    fn check_department(&self, id: Option<DepartmentId>) -> AppResult<()> {
        match id {
            Some(id) if !self.departments.contains_key(&id) => Err(AppError::validation(
                format!("Department {id} does not exist"),
            )),
            _ => Ok(()),
        }
    }

    fn check_user_unique(&self, username: &str, email: &str, except: Option<UserId>) -> AppResult<()> {
        for user in self.users.values() {
            if Some(user.id) == except {
                continue;
            }
            if user.username == username {
                return Err(AppError::conflict(format!(
                    "Username '{username}' is already taken"
                )));
            }
            if user.email == email {
                return Err(AppError::conflict(format!(
                    "Email '{email}' is already registered"
                )));
            }
        }
        Ok(())
    }

    fn check_department_unique(&self, name: &str, except: Option<DepartmentId>) -> AppResult<()> {
        let taken = self
            .departments
            .values()
            .any(|d| d.name == name && Some(d.id) != except);
        if taken {
            return Err(AppError::conflict(format!(
                "Department '{name}' already exists"
            )));
        }
        Ok(())
    }

    fn remove_user(&mut self, id: UserId) -> bool {
        self.logs.retain(|log| log.operator_id != id);
        self.users.remove(&id).is_some()
    }
}

/// Store that keeps every table in memory.
///
/// Cloning shares the underlying tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operation log entry, oldest first.
    pub async fn operation_logs(&self) -> Vec<OperationLog> {
        self.tables.read().await.logs.clone()
    }

    /// Number of stored users.
    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    /// Number of stored departments.
    pub async fn department_count(&self) -> usize {
        self.tables.read().await.departments.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, data: &CreateUser) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        tables.check_user_unique(&data.username, &data.email, None)?;
        tables.check_department(data.department_id)?;

        tables.next_user += 1;
        let now = Utc::now();
        let user = User {
            id: UserId(tables.next_user),
            username: data.username.clone(),
            name: data.name.clone(),
            email: data.email.clone(),
            password_hash: data.password_hash.clone(),
            department_id: data.department_id,
            remark: data.remark.clone(),
            member_since: now,
            last_seen: now,
        };
        tables.users.insert(user.id, user.clone());
        debug!(user_id = %user.id, "Inserted user");
        Ok(user)
    }

    async fn save_user(&self, user: &User) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user.id) {
            return Err(AppError::not_found(format!("User {} not found", user.id)));
        }
        tables.check_user_unique(&user.username, &user.email, Some(user.id))?;
        tables.check_department(user.department_id)?;
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn touch_last_seen(&self, id: UserId, at: DateTime<Utc>) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
        user.touch(at);
        Ok(())
    }

    async fn delete_user(&self, id: UserId) -> AppResult<bool> {
        Ok(self.tables.write().await.remove_user(id))
    }
}

#[async_trait]
impl DepartmentStore for MemoryStore {
    async fn find_department_by_id(&self, id: DepartmentId) -> AppResult<Option<Department>> {
        Ok(self.tables.read().await.departments.get(&id).cloned())
    }

    async fn create_department(&self, data: &CreateDepartment) -> AppResult<Department> {
        let permissions = data.permissions.to_json()?;
        let mut tables = self.tables.write().await;
        tables.check_department_unique(&data.name, None)?;

        tables.next_department += 1;
        let department = Department {
            id: DepartmentId(tables.next_department),
            name: data.name.clone(),
            description: data.description.clone(),
            active: data.active,
            permissions,
            created_at: Utc::now(),
        };
        tables.departments.insert(department.id, department.clone());
        Ok(department)
    }

    async fn update_department(&self, department: &Department) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.departments.contains_key(&department.id) {
            return Err(AppError::not_found(format!(
                "Department {} not found",
                department.id
            )));
        }
        tables.check_department_unique(&department.name, Some(department.id))?;
        tables.departments.insert(department.id, department.clone());
        Ok(())
    }

    async fn delete_department(&self, id: DepartmentId) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.departments.remove(&id).is_none() {
            return Ok(false);
        }
        let members: Vec<UserId> = tables
            .users
            .values()
            .filter(|u| u.department_id == Some(id))
            .map(|u| u.id)
            .collect();
        for member in &members {
            tables.remove_user(*member);
        }
        debug!(department_id = %id, members = members.len(), "Deleted department");
        Ok(true)
    }
}

#[async_trait]
impl OperationLogStore for MemoryStore {
    async fn save_operation_log(&self, entry: &CreateOperationLog) -> AppResult<OperationLog> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&entry.operator_id) {
            return Err(AppError::validation(format!(
                "Operator {} does not exist",
                entry.operator_id
            )));
        }
        tables.next_log += 1;
        let log = OperationLog {
            id: OperationLogId(tables.next_log),
            operator_id: entry.operator_id,
            description: entry.description.clone(),
            timestamp: Utc::now(),
            ip: entry.ip.clone(),
        };
        tables.logs.push(log.clone());
        Ok(log)
    }

    async fn find_operation_logs_by_operator(
        &self,
        operator_id: UserId,
        on: Option<NaiveDate>,
    ) -> AppResult<Vec<OperationLog>> {
        let tables = self.tables.read().await;
        Ok(tables
            .logs
            .iter()
            .rev()
            .filter(|log| log.operator_id == operator_id)
            .filter(|log| on.is_none_or(|day| log.timestamp.date_naive() == day))
            .cloned()
            .collect())
    }
}
