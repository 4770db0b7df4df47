//! Authentication configuration.

use serde::{Deserialize, Serialize};

const DEFAULT_JWT_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Token signing and lifetime configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Value of the `iss` claim on access and refresh tokens.
    #[serde(default = "default_issuer")]
    pub jwt_issuer: String,
    /// Access token TTL in hours.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_hours: i64,
    /// Refresh token TTL in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_days: i64,
    /// Legacy session token TTL in seconds.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: i64,
    /// Clock-skew allowance applied to `exp` checks, in seconds.
    #[serde(default)]
    pub leeway_seconds: u64,
    /// Minimum accepted length for new passwords.
    #[serde(default = "default_password_min_length")]
    pub password_min_length: usize,
}

impl AuthConfig {
    /// Whether the signing secret is still the shipped placeholder.
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_issuer: default_issuer(),
            access_ttl_hours: default_access_ttl(),
            refresh_ttl_days: default_refresh_ttl(),
            session_ttl_seconds: default_session_ttl(),
            leeway_seconds: 0,
            password_min_length: default_password_min_length(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"****")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("access_ttl_hours", &self.access_ttl_hours)
            .field("refresh_ttl_days", &self.refresh_ttl_days)
            .field("session_ttl_seconds", &self.session_ttl_seconds)
            .field("leeway_seconds", &self.leeway_seconds)
            .field("password_min_length", &self.password_min_length)
            .finish()
    }
}

fn default_jwt_secret() -> String {
    DEFAULT_JWT_SECRET.to_string()
}

fn default_issuer() -> String {
    "deptadmin".to_string()
}

fn default_access_ttl() -> i64 {
    2
}

fn default_refresh_ttl() -> i64 {
    30
}

fn default_session_ttl() -> i64 {
    3600
}

fn default_password_min_length() -> usize {
    8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_masks_secret() {
        let config = AuthConfig {
            jwt_secret: "super-secret".to_string(),
            ..AuthConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(!config.uses_default_secret());
    }
}
