//! Decides whether a principal may perform an action on a resource.

use std::sync::Arc;

use tracing::{debug, warn};

use deptadmin_database::store::DepartmentStore;
use deptadmin_entity::department::{Department, PermissionSet};
use deptadmin_entity::user::User;

use crate::error::AuthError;

/// Evaluates `(resource, action)` requests against the principal's department.
///
/// Every check reloads the department, so permission and `active` changes
/// take effect on the next request.
#[derive(Clone)]
pub struct PermissionEvaluator {
    departments: Arc<dyn DepartmentStore>,
}

impl std::fmt::Debug for PermissionEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionEvaluator").finish_non_exhaustive()
    }
}

impl PermissionEvaluator {
    /// Creates an evaluator over the given department store.
    pub fn new(departments: Arc<dyn DepartmentStore>) -> Self {
        Self { departments }
    }

    /// Returns `true` iff `principal` may perform `action` on `resource`.
    pub async fn authorize(&self, principal: &User, resource: &str, action: &str) -> bool {
        self.check(principal, resource, action).await.is_ok()
    }

    /// Like [`authorize`](Self::authorize) but reports why a request was denied.
    ///
    /// Denies when the principal has no department, the department is missing
    /// or inactive, its permissions cannot be parsed, or `resource` does not
    /// list `action`.
    pub async fn check(
        &self,
        principal: &User,
        resource: &str,
        action: &str,
    ) -> Result<(), AuthError> {
        let department = self.load_department(principal).await?;

        if !department.active {
            debug!(department_id = %department.id, user_id = %principal.id, "Department is inactive");
            return Err(AuthError::Unauthorized(format!(
                "department '{}' is inactive",
                department.name
            )));
        }

        let permissions = parse_permissions(&department)?;
        if permissions.allows(resource, action) {
            Ok(())
        } else {
            debug!(user_id = %principal.id, resource, action, "Permission denied");
            Err(AuthError::Unauthorized(format!(
                "missing permission {resource}:{action}"
            )))
        }
    }

    /// The permission set currently granted to `principal`.
    ///
    /// Empty when the principal has no department or the department is
    /// inactive. Parse failures and store failures are reported.
    pub async fn effective_permissions(&self, principal: &User) -> Result<PermissionSet, AuthError> {
        let Some(department_id) = principal.department_id else {
            return Ok(PermissionSet::new());
        };
        let department = self
            .departments
            .find_department_by_id(department_id)
            .await
            .map_err(AuthError::StoreUnavailable)?;

        match department {
            Some(department) if department.active => parse_permissions(&department),
            _ => Ok(PermissionSet::new()),
        }
    }

    async fn load_department(&self, principal: &User) -> Result<Department, AuthError> {
        let Some(department_id) = principal.department_id else {
            debug!(user_id = %principal.id, "Principal has no department");
            return Err(AuthError::Unauthorized("no department assigned".to_string()));
        };

        match self.departments.find_department_by_id(department_id).await {
            Ok(Some(department)) => Ok(department),
            Ok(None) => {
                warn!(user_id = %principal.id, %department_id, "Principal references a missing department");
                Err(AuthError::Unauthorized("department not found".to_string()))
            }
            Err(e) => {
                warn!(%department_id, error = %e, "Store failure while loading department");
                Err(AuthError::Unauthorized(
                    "department could not be loaded".to_string(),
                ))
            }
        }
    }
}

fn parse_permissions(department: &Department) -> Result<PermissionSet, AuthError> {
    department.permission_set().map_err(|e| {
        warn!(
            department_id = %department.id,
            error = %e,
            "Stored permission data is malformed; denying"
        );
        AuthError::MalformedPermissionData {
            department_id: department.id,
            reason: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use deptadmin_database::MemoryStore;
    use deptadmin_database::store::UserStore;
    use deptadmin_entity::department::CreateDepartment;
    use deptadmin_entity::user::CreateUser;

    use super::*;

    async fn member_of(store: &MemoryStore, active: bool) -> (User, Department) {
        let department = store
            .create_department(&CreateDepartment {
                name: "Sales".to_string(),
                description: String::new(),
                active,
                permissions: PermissionSet::new().with("dept", ["edit", "view"]),
            })
            .await
            .unwrap();
        let user = store
            .create_user(&CreateUser {
                username: "p".to_string(),
                name: "P".to_string(),
                email: "p@example.com".to_string(),
                password_hash: String::new(),
                department_id: Some(department.id),
                remark: String::new(),
            })
            .await
            .unwrap();
        (user, department)
    }

    #[tokio::test]
    async fn test_sales_scenario() {
        let store = MemoryStore::new();
        let (p, _) = member_of(&store, true).await;
        let evaluator = PermissionEvaluator::new(Arc::new(store));

        assert!(evaluator.authorize(&p, "dept", "edit").await);
        assert!(!evaluator.authorize(&p, "dept", "delete").await);
        assert!(!evaluator.authorize(&p, "other", "view").await);
    }

    #[tokio::test]
    async fn test_inactive_department_denies_everything() {
        let store = MemoryStore::new();
        let (p, _) = member_of(&store, false).await;
        let evaluator = PermissionEvaluator::new(Arc::new(store));

        assert!(!evaluator.authorize(&p, "dept", "edit").await);
        assert!(evaluator.effective_permissions(&p).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_permissions_fail_closed() {
        let store = MemoryStore::new();
        let (p, mut department) = member_of(&store, true).await;
        department.permissions = r#"{"dept": "edit"}"#.to_string();
        store.update_department(&department).await.unwrap();
        let evaluator = PermissionEvaluator::new(Arc::new(store));

        let err = evaluator.check(&p, "dept", "edit").await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::MalformedPermissionData { department_id, .. } if department_id == department.id
        ));
        assert!(err.is_denial());
        assert!(evaluator.effective_permissions(&p).await.is_err());
    }

    #[tokio::test]
    async fn test_no_department_denies() {
        let store = MemoryStore::new();
        let (mut p, _) = member_of(&store, true).await;
        p.department_id = None;
        let evaluator = PermissionEvaluator::new(Arc::new(store));

        assert!(!evaluator.authorize(&p, "dept", "view").await);
        assert!(evaluator.effective_permissions(&p).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_permission_update_applies_to_next_check() {
        let store = MemoryStore::new();
        let (p, mut department) = member_of(&store, true).await;
        let evaluator = PermissionEvaluator::new(Arc::new(store.clone()));
        assert!(!evaluator.authorize(&p, "dept", "delete").await);

        department.permissions = PermissionSet::new()
            .with("dept", ["delete"])
            .to_json()
            .unwrap();
        store.update_department(&department).await.unwrap();
        assert!(evaluator.authorize(&p, "dept", "delete").await);
        assert!(!evaluator.authorize(&p, "dept", "edit").await);
    }
}
