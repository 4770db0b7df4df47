//! JWT claim sets for access, refresh and legacy session tokens.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use deptadmin_core::types::UserId;
use deptadmin_entity::user::User;

/// Class flag carried by access and refresh tokens.
///
/// Serialized as the integer `0` (access) or `1` (refresh). Any other value
/// fails to deserialize, which makes the token malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TokenClass {
    /// Usable for authenticated requests.
    Access,
    /// Only exchangeable for a new access token.
    Refresh,
}

impl TryFrom<u8> for TokenClass {
    type Error = String;

    fn try_from(flag: u8) -> Result<Self, Self::Error> {
        match flag {
            0 => Ok(Self::Access),
            1 => Ok(Self::Refresh),
            other => Err(format!("unknown token class flag {other}")),
        }
    }
}

impl From<TokenClass> for u8 {
    fn from(class: TokenClass) -> u8 {
        match class {
            TokenClass::Access => 0,
            TokenClass::Refresh => 1,
        }
    }
}

/// Claims of an access or refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Issuer.
    pub iss: String,
    /// Subject.
    pub user_id: UserId,
    /// Access or refresh.
    pub flag: TokenClass,
}

impl AccessClaims {
    /// Build a claim set issued at `issued_at` and valid for `ttl`.
    pub fn new(
        user_id: UserId,
        flag: TokenClass,
        issuer: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            exp: (issued_at + ttl).timestamp(),
            iat: issued_at.timestamp(),
            iss: issuer.into(),
            user_id,
            flag,
        }
    }

    /// Whether this token may be used to reach protected operations.
    pub fn is_access(&self) -> bool {
        self.flag == TokenClass::Access
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Claims of the legacy single-token session form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject.
    pub user_id: UserId,
    /// Login name, or the display name when the login name is empty.
    pub user_name: String,
    /// Display name, or the login name when the display name is empty.
    pub name: String,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
}

impl SessionClaims {
    /// Build a session claim set for `user`.
    pub fn for_user(user: &User, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            user_id: user.id,
            user_name: user.token_user_name().to_string(),
            name: user.token_display_name().to_string(),
            exp: (issued_at + ttl).timestamp(),
            iat: issued_at.timestamp(),
        }
    }
}
