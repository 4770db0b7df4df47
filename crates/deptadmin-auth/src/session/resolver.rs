//! Turns an inbound token into the principal it names.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use deptadmin_database::store::UserStore;
use deptadmin_entity::user::User;

use crate::error::AuthError;
use crate::jwt::JwtDecoder;

/// Resolves access tokens to users and records their activity.
///
/// Only access-class tokens are accepted. Refresh tokens and legacy session
/// tokens never reach a protected operation.
#[derive(Clone)]
pub struct SessionResolver {
    decoder: JwtDecoder,
    users: Arc<dyn UserStore>,
}

impl std::fmt::Debug for SessionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionResolver")
            .field("decoder", &self.decoder)
            .finish_non_exhaustive()
    }
}

impl SessionResolver {
    /// Creates a resolver over the given user store.
    pub fn new(decoder: JwtDecoder, users: Arc<dyn UserStore>) -> Self {
        Self { decoder, users }
    }

    /// Resolve `token` to a user.
    ///
    /// An absent or blank token fails before any store access. On success the
    /// user's `last_seen` is set to now and persisted on its own; a failed
    /// write is logged and does not fail the resolution.
    pub async fn resolve(&self, token: Option<&str>) -> Result<User, AuthError> {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return Err(AuthError::Unauthenticated("no token supplied".to_string()));
        };

        let claims = self
            .decoder
            .decode_access(token)
            .map_err(|e| AuthError::Unauthenticated(e.to_string()))?;

        if !claims.is_access() {
            debug!(user_id = %claims.user_id, "Refresh token presented for resource access");
            return Err(AuthError::Unauthenticated(
                "refresh tokens cannot access resources".to_string(),
            ));
        }

        let mut user = match self.users.find_user_by_id(claims.user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                debug!(user_id = %claims.user_id, "Token subject no longer exists");
                return Err(AuthError::Unauthenticated("unknown principal".to_string()));
            }
            Err(e) => {
                if e.is_store_failure() {
                    warn!(user_id = %claims.user_id, error = %e, "Store failure while loading principal");
                } else {
                    debug!(user_id = %claims.user_id, error = %e, "Principal could not be loaded");
                }
                return Err(AuthError::Unauthenticated(
                    "principal could not be loaded".to_string(),
                ));
            }
        };

        let now = Utc::now();
        match self.users.touch_last_seen(user.id, now).await {
            Ok(()) => user.touch(now),
            Err(e) => warn!(user_id = %user.id, error = %e, "Failed to record last_seen"),
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{DateTime, Duration};

    use deptadmin_core::config::AuthConfig;
    use deptadmin_core::result::AppResult;
    use deptadmin_core::types::UserId;
    use deptadmin_database::MemoryStore;
    use deptadmin_database::store::DepartmentStore;
    use deptadmin_entity::department::{CreateDepartment, PermissionSet};
    use deptadmin_entity::user::CreateUser;

    use super::*;
    use crate::jwt::JwtEncoder;

    async fn fixture() -> (SessionResolver, JwtEncoder, MemoryStore, User) {
        let config = AuthConfig::default();
        let store = MemoryStore::new();
        let user = store
            .create_user(&CreateUser {
                username: "admin1".to_string(),
                name: "admin1".to_string(),
                email: "admin@admin.com".to_string(),
                password_hash: String::new(),
                department_id: None,
                remark: String::new(),
            })
            .await
            .unwrap();
        let resolver = SessionResolver::new(JwtDecoder::new(&config), Arc::new(store.clone()));
        (resolver, JwtEncoder::new(&config), store, user)
    }

    #[tokio::test]
    async fn test_blank_token_is_unauthenticated() {
        let (resolver, _, _, _) = fixture().await;
        assert!(resolver.resolve(None).await.unwrap_err().is_unauthenticated());
        assert!(resolver.resolve(Some("  ")).await.unwrap_err().is_unauthenticated());
    }

    #[tokio::test]
    async fn test_access_token_resolves_and_touches() {
        let (resolver, encoder, store, user) = fixture().await;
        let before = Utc::now().timestamp();
        let token = encoder.issue_access(user.id, Duration::hours(2)).unwrap();

        let resolved = resolver.resolve(Some(&token)).await.unwrap();
        assert_eq!(resolved.id, user.id);

        let stored = store.find_user_by_id(user.id).await.unwrap().unwrap();
        assert!(stored.last_seen.timestamp() >= before);
        assert_eq!(stored.last_seen, resolved.last_seen);
    }

    /// Hands out the stored row, then applies an admin edit before the
    /// caller gets to write anything back.
    struct EditAfterRead {
        inner: MemoryStore,
    }

    #[async_trait]
    impl UserStore for EditAfterRead {
        async fn find_user_by_id(&self, id: UserId) -> AppResult<Option<User>> {
            let snapshot = self.inner.find_user_by_id(id).await?;
            if let Some(user) = &snapshot {
                let mut edited = user.clone();
                edited.department_id = None;
                edited.password_hash = "rotated".to_string();
                self.inner.save_user(&edited).await?;
            }
            Ok(snapshot)
        }

        async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
            self.inner.find_user_by_username(username).await
        }

        async fn create_user(&self, data: &CreateUser) -> AppResult<User> {
            self.inner.create_user(data).await
        }

        async fn save_user(&self, user: &User) -> AppResult<()> {
            self.inner.save_user(user).await
        }

        async fn touch_last_seen(&self, id: UserId, at: DateTime<Utc>) -> AppResult<()> {
            self.inner.touch_last_seen(id, at).await
        }

        async fn delete_user(&self, id: UserId) -> AppResult<bool> {
            self.inner.delete_user(id).await
        }
    }

    #[tokio::test]
    async fn test_touch_does_not_revert_concurrent_admin_edit() {
        let config = AuthConfig::default();
        let store = MemoryStore::new();
        let department = store
            .create_department(&CreateDepartment {
                name: "Sales".to_string(),
                description: String::new(),
                active: true,
                permissions: PermissionSet::new().with("dept", ["view"]),
            })
            .await
            .unwrap();
        let user = store
            .create_user(&CreateUser {
                username: "alice".to_string(),
                name: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password_hash: "old".to_string(),
                department_id: Some(department.id),
                remark: String::new(),
            })
            .await
            .unwrap();

        let resolver = SessionResolver::new(
            JwtDecoder::new(&config),
            Arc::new(EditAfterRead {
                inner: store.clone(),
            }),
        );
        let token = JwtEncoder::new(&config)
            .issue_access(user.id, Duration::hours(2))
            .unwrap();
        let resolved = resolver.resolve(Some(&token)).await.unwrap();

        let stored = store.find_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.department_id, None);
        assert_eq!(stored.password_hash, "rotated");
        assert_eq!(stored.last_seen, resolved.last_seen);
    }

    #[tokio::test]
    async fn test_refresh_token_is_rejected() {
        let (resolver, encoder, _, user) = fixture().await;
        let token = encoder.issue_refresh(user.id, Duration::days(30)).unwrap();
        assert!(resolver.resolve(Some(&token)).await.unwrap_err().is_unauthenticated());
    }

    #[tokio::test]
    async fn test_deleted_user_is_rejected() {
        let (resolver, encoder, store, user) = fixture().await;
        let token = encoder.issue_access(user.id, Duration::hours(2)).unwrap();
        store.delete_user(user.id).await.unwrap();
        assert!(resolver.resolve(Some(&token)).await.unwrap_err().is_unauthenticated());
    }

    #[tokio::test]
    async fn test_legacy_session_token_is_rejected() {
        let (resolver, encoder, _, user) = fixture().await;
        let token = encoder.issue_default_session(&user).unwrap();
        assert!(resolver.resolve(Some(&token)).await.unwrap_err().is_unauthenticated());
    }
}
