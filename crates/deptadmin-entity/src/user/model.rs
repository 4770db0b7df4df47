//! User entity model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use deptadmin_core::types::{DepartmentId, UserId};

/// A registered principal in the DeptAdmin system.
#[derive(Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Human-readable display name.
    pub name: String,
    /// Email address (unique).
    pub email: String,
    /// Argon2 password hash. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Department the user belongs to; permission checks go through it.
    pub department_id: Option<DepartmentId>,
    /// Free-text remark.
    pub remark: String,
    /// Registration time.
    pub member_since: DateTime<Utc>,
    /// Last successful authentication.
    pub last_seen: DateTime<Utc>,
}

impl User {
    /// Name carried in the legacy session token's `user_name` claim.
    ///
    /// Falls back to the display name when the username is empty.
    pub fn token_user_name(&self) -> &str {
        if self.username.is_empty() {
            &self.name
        } else {
            &self.username
        }
    }

    /// Name carried in the legacy session token's `name` claim.
    ///
    /// Falls back to the username when the display name is empty.
    pub fn token_display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.username
        } else {
            &self.name
        }
    }

    /// Record activity at the given instant.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.last_seen = at;
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("department_id", &self.department_id)
            .field("member_since", &self.member_since)
            .field("last_seen", &self.last_seen)
            .finish_non_exhaustive()
    }
}

/// Data required to create a new user.
#[derive(Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Desired username.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Pre-hashed password.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Owning department.
    pub department_id: Option<DepartmentId>,
    /// Free-text remark.
    pub remark: String,
}

impl fmt::Debug for CreateUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateUser")
            .field("username", &self.username)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("department_id", &self.department_id)
            .finish_non_exhaustive()
    }
}

/// Data for updating an existing user's profile.
///
/// `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New username.
    pub username: Option<String>,
    /// New display name.
    pub name: Option<String>,
    /// New email address.
    pub email: Option<String>,
    /// New remark.
    pub remark: Option<String>,
}

impl UpdateUser {
    /// Apply the present fields onto `user`.
    pub fn apply_to(self, user: &mut User) {
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(remark) = self.remark {
            user.remark = remark;
        }
    }
}
