//! Department entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use deptadmin_core::types::DepartmentId;

use super::permission::PermissionSet;

/// A department: the permission boundary for its member users.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Department {
    /// Unique department identifier.
    pub id: DepartmentId,
    /// Unique department name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Inactive departments are denied every permission check.
    pub active: bool,
    /// Serialized [`PermissionSet`], exactly as stored.
    pub permissions: String,
    /// When the department was created.
    pub created_at: DateTime<Utc>,
}

impl Department {
    /// Parse the stored permission mapping.
    pub fn permission_set(&self) -> Result<PermissionSet, serde_json::Error> {
        PermissionSet::parse(&self.permissions)
    }
}

/// Data required to create a new department.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDepartment {
    /// Department name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Whether the department starts active.
    pub active: bool,
    /// Initial permission set.
    pub permissions: PermissionSet,
}
