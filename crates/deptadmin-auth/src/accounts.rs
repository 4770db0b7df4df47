//! Administrative management of users and departments.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use deptadmin_core::config::AuthConfig;
use deptadmin_core::error::AppError;
use deptadmin_core::result::AppResult;
use deptadmin_core::types::{DepartmentId, UserId};
use deptadmin_database::store::{DepartmentStore, UserStore};
use deptadmin_entity::department::{CreateDepartment, Department, PermissionSet};
use deptadmin_entity::user::{CreateUser, UpdateUser, User};

use crate::password::{PasswordHasher, PasswordValidator};

/// Input for creating a user account.
#[derive(Clone, Validate, Serialize, Deserialize)]
pub struct NewAccount {
    /// Login name.
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    /// Display name.
    #[validate(length(max = 64))]
    #[serde(default)]
    pub name: String,
    /// Email address.
    #[validate(email)]
    pub email: String,
    /// Plaintext password; hashed before it reaches the store.
    pub password: String,
    /// Owning department.
    pub department_id: Option<DepartmentId>,
    /// Free-text remark.
    #[validate(length(max = 512))]
    #[serde(default)]
    pub remark: String,
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("department_id", &self.department_id)
            .finish_non_exhaustive()
    }
}

/// Creates, updates and deletes users and departments.
///
/// Deleting a department deletes its member users; deleting a user deletes
/// the operation log entries it owns.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    departments: Arc<dyn DepartmentStore>,
    hasher: PasswordHasher,
    password_policy: PasswordValidator,
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService")
            .field("password_policy", &self.password_policy)
            .finish_non_exhaustive()
    }
}

impl AccountService {
    /// Creates a new account service.
    pub fn new(
        users: Arc<dyn UserStore>,
        departments: Arc<dyn DepartmentStore>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            users,
            departments,
            hasher: PasswordHasher::new(),
            password_policy: PasswordValidator::new(config),
        }
    }

    /// Validate, hash the password and persist a new user.
    pub async fn create_user(&self, account: NewAccount) -> AppResult<User> {
        account
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;
        self.password_policy.validate(&account.password)?;
        if let Some(department_id) = account.department_id {
            self.require_department(department_id).await?;
        }

        let password_hash = self.hasher.hash_password(&account.password)?;
        let user = self
            .users
            .create_user(&CreateUser {
                name: if account.name.is_empty() {
                    account.username.clone()
                } else {
                    account.name
                },
                username: account.username,
                email: account.email,
                password_hash,
                department_id: account.department_id,
                remark: account.remark,
            })
            .await?;

        info!(user_id = %user.id, department_id = ?user.department_id, "Created user");
        Ok(user)
    }

    /// Apply a profile update.
    pub async fn update_profile(&self, id: UserId, update: UpdateUser) -> AppResult<User> {
        let mut user = self.require_user(id).await?;
        update.apply_to(&mut user);
        self.users.save_user(&user).await?;
        Ok(user)
    }

    /// Move a user into `department_id`, or out of every department.
    pub async fn change_department(
        &self,
        id: UserId,
        department_id: Option<DepartmentId>,
    ) -> AppResult<User> {
        if let Some(department_id) = department_id {
            self.require_department(department_id).await?;
        }
        let mut user = self.require_user(id).await?;
        user.department_id = department_id;
        self.users.save_user(&user).await?;
        info!(user_id = %id, department_id = ?department_id, "Changed user department");
        Ok(user)
    }

    /// Delete a user and its operation log entries.
    pub async fn delete_user(&self, id: UserId) -> AppResult<()> {
        if !self.users.delete_user(id).await? {
            return Err(AppError::not_found(format!("User {id} not found")));
        }
        info!(user_id = %id, "Deleted user");
        Ok(())
    }

    /// Create an active department.
    pub async fn create_department(
        &self,
        name: &str,
        description: &str,
        permissions: PermissionSet,
    ) -> AppResult<Department> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Department name must not be empty"));
        }
        let department = self
            .departments
            .create_department(&CreateDepartment {
                name: name.to_string(),
                description: description.to_string(),
                active: true,
                permissions,
            })
            .await?;
        info!(department_id = %department.id, "Created department");
        Ok(department)
    }

    /// Activate or deactivate a department.
    pub async fn set_department_active(
        &self,
        id: DepartmentId,
        active: bool,
    ) -> AppResult<Department> {
        let mut department = self.require_department(id).await?;
        department.active = active;
        self.departments.update_department(&department).await?;
        info!(department_id = %id, active, "Changed department state");
        Ok(department)
    }

    /// Replace a department's permission set.
    pub async fn set_department_permissions(
        &self,
        id: DepartmentId,
        permissions: &PermissionSet,
    ) -> AppResult<Department> {
        let mut department = self.require_department(id).await?;
        department.permissions = permissions.to_json()?;
        self.departments.update_department(&department).await?;
        info!(department_id = %id, "Replaced department permissions");
        Ok(department)
    }

    /// Allow `action` on `resource` for a department.
    pub async fn grant_permission(
        &self,
        id: DepartmentId,
        resource: &str,
        action: &str,
    ) -> AppResult<Department> {
        let department = self.require_department(id).await?;
        let mut permissions = department.permission_set()?;
        permissions.grant(resource, action);
        self.set_department_permissions(id, &permissions).await
    }

    /// Withdraw `action` on `resource` from a department.
    pub async fn revoke_permission(
        &self,
        id: DepartmentId,
        resource: &str,
        action: &str,
    ) -> AppResult<Department> {
        let department = self.require_department(id).await?;
        let mut permissions = department.permission_set()?;
        if !permissions.revoke(resource, action) {
            return Err(AppError::not_found(format!(
                "Department {id} does not grant {resource}:{action}"
            )));
        }
        self.set_department_permissions(id, &permissions).await
    }

    /// Delete a department together with its member users.
    pub async fn delete_department(&self, id: DepartmentId) -> AppResult<()> {
        if !self.departments.delete_department(id).await? {
            return Err(AppError::not_found(format!("Department {id} not found")));
        }
        Ok(())
    }

    async fn require_user(&self, id: UserId) -> AppResult<User> {
        self.users
            .find_user_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    async fn require_department(&self, id: DepartmentId) -> AppResult<Department> {
        self.departments
            .find_department_by_id(id)
            .await?
            .ok_or_else(|| AppError::validation(format!("Department {id} does not exist")))
    }
}

#[cfg(test)]
mod tests {
    use deptadmin_core::error::ErrorKind;
    use deptadmin_database::MemoryStore;

    use super::*;

    fn service(store: &MemoryStore) -> AccountService {
        let shared = Arc::new(store.clone());
        AccountService::new(shared.clone(), shared, &AuthConfig::default())
    }

    fn account(username: &str, department_id: Option<DepartmentId>) -> NewAccount {
        NewAccount {
            username: username.to_string(),
            name: String::new(),
            email: format!("{username}@example.com"),
            password: "admin1234".to_string(),
            department_id,
            remark: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_user_hashes_password() {
        let store = MemoryStore::new();
        let accounts = service(&store);
        let user = accounts.create_user(account("alice", None)).await.unwrap();

        assert_ne!(user.password_hash, "admin1234");
        assert!(PasswordHasher::new().verify_password("admin1234", &user.password_hash).unwrap());
        assert_eq!(user.name, "alice");
    }

    #[tokio::test]
    async fn test_create_user_rejects_bad_input() {
        let store = MemoryStore::new();
        let accounts = service(&store);

        let mut bad_email = account("alice", None);
        bad_email.email = "not-an-email".to_string();
        assert_eq!(accounts.create_user(bad_email).await.unwrap_err().kind, ErrorKind::Validation);

        let mut weak = account("bob", None);
        weak.password = "short".to_string();
        assert_eq!(accounts.create_user(weak).await.unwrap_err().kind, ErrorKind::Validation);

        let orphan = account("carol", Some(DepartmentId(99)));
        assert_eq!(accounts.create_user(orphan).await.unwrap_err().kind, ErrorKind::Validation);
        assert_eq!(store.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_delete_department_removes_members() {
        let store = MemoryStore::new();
        let accounts = service(&store);
        let sales = accounts
            .create_department("Sales", "", PermissionSet::new().with("dept", ["view"]))
            .await
            .unwrap();
        let member = accounts.create_user(account("alice", Some(sales.id))).await.unwrap();

        accounts.delete_department(sales.id).await.unwrap();
        assert_eq!(
            accounts.update_profile(member.id, UpdateUser::default()).await.unwrap_err().kind,
            ErrorKind::NotFound
        );
        assert_eq!(
            accounts.delete_department(sales.id).await.unwrap_err().kind,
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_permission_and_state_updates_persist() {
        let store = MemoryStore::new();
        let accounts = service(&store);
        let sales = accounts
            .create_department("Sales", "", PermissionSet::new())
            .await
            .unwrap();

        accounts
            .set_department_permissions(sales.id, &PermissionSet::new().with("dept", ["view", "view"]))
            .await
            .unwrap();
        let stored = accounts.set_department_active(sales.id, false).await.unwrap();

        assert!(!stored.active);
        assert_eq!(stored.permissions, r#"{"dept":["view"]}"#);
    }

    #[tokio::test]
    async fn test_grant_and_revoke_single_actions() {
        let store = MemoryStore::new();
        let accounts = service(&store);
        let sales = accounts
            .create_department("Sales", "", PermissionSet::new().with("dept", ["view"]))
            .await
            .unwrap();

        let granted = accounts.grant_permission(sales.id, "dept", "edit").await.unwrap();
        assert_eq!(granted.permissions, r#"{"dept":["edit","view"]}"#);

        accounts.revoke_permission(sales.id, "dept", "view").await.unwrap();
        let revoked = accounts.revoke_permission(sales.id, "dept", "edit").await.unwrap();
        assert_eq!(revoked.permissions, "{}");

        let err = accounts
            .revoke_permission(sales.id, "dept", "edit")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_change_department_requires_existing_target() {
        let store = MemoryStore::new();
        let accounts = service(&store);
        let user = accounts.create_user(account("alice", None)).await.unwrap();

        let err = accounts
            .change_department(user.id, Some(DepartmentId(5)))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let moved = accounts.change_department(user.id, None).await.unwrap();
        assert_eq!(moved.department_id, None);
    }
}
