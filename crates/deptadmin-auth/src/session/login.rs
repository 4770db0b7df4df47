//! Credential login issuing an access/refresh pair.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use deptadmin_core::error::AppError;
use deptadmin_database::store::UserStore;
use deptadmin_entity::department::PermissionSet;
use deptadmin_entity::user::User;

use crate::error::AuthError;
use crate::jwt::{JwtEncoder, TokenPair};
use crate::password::PasswordHasher;
use crate::permission::PermissionEvaluator;

const BAD_CREDENTIALS: &str = "invalid username or password";

/// Result of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResult {
    /// The authenticated user.
    pub user: User,
    /// Generated token pair.
    pub tokens: TokenPair,
    /// Permissions currently granted through the user's department.
    pub permissions: PermissionSet,
}

/// Verifies credentials and issues tokens.
#[derive(Clone)]
pub struct LoginService {
    users: Arc<dyn UserStore>,
    evaluator: Arc<PermissionEvaluator>,
    encoder: JwtEncoder,
    hasher: PasswordHasher,
}

impl std::fmt::Debug for LoginService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginService")
            .field("encoder", &self.encoder)
            .finish_non_exhaustive()
    }
}

impl LoginService {
    /// Creates a new login service.
    pub fn new(
        users: Arc<dyn UserStore>,
        evaluator: Arc<PermissionEvaluator>,
        encoder: JwtEncoder,
    ) -> Self {
        Self {
            users,
            evaluator,
            encoder,
            hasher: PasswordHasher::new(),
        }
    }

    /// Performs the login flow:
    ///
    /// 1. Find the user by username
    /// 2. Verify the password
    /// 3. Issue an access/refresh pair
    /// 4. Record activity and collect the department's permissions
    ///
    /// Unknown users and wrong passwords fail with the same message.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        let mut user = self
            .users
            .find_user_by_username(username)
            .await
            .map_err(AuthError::StoreUnavailable)?
            .ok_or_else(|| AuthError::Unauthenticated(BAD_CREDENTIALS.to_string()))?;

        let valid = self
            .hasher
            .verify_password(password, &user.password_hash)
            .unwrap_or_else(|e| {
                warn!(user_id = %user.id, error = %e, "Stored password digest is unreadable");
                false
            });
        if !valid {
            info!(user_id = %user.id, "Login failed: wrong password");
            return Err(AuthError::Unauthenticated(BAD_CREDENTIALS.to_string()));
        }

        let tokens = self
            .encoder
            .issue_pair(user.id)
            .map_err(|e| {
                warn!(user_id = %user.id, error = %e, "Failed to sign login tokens");
                AuthError::Internal(AppError::internal(e.to_string()))
            })?;

        let now = Utc::now();
        match self.users.touch_last_seen(user.id, now).await {
            Ok(()) => user.touch(now),
            Err(e) => warn!(user_id = %user.id, error = %e, "Failed to record last_seen"),
        }

        let permissions = match self.evaluator.effective_permissions(&user).await {
            Ok(permissions) => permissions,
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "Returning empty permissions at login");
                PermissionSet::new()
            }
        };

        info!(user_id = %user.id, "Login successful");
        Ok(LoginResult {
            user,
            tokens,
            permissions,
        })
    }
}
