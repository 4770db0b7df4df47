//! JWT token creation with configurable signing and TTL.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

use deptadmin_core::config::AuthConfig;
use deptadmin_core::types::UserId;
use deptadmin_entity::user::User;

use super::claims::{AccessClaims, SessionClaims, TokenClass};
use super::error::TokenError;

/// Creates HS256-signed access, refresh and session tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// `iss` claim written into access and refresh tokens.
    issuer: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
    session_ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("issuer", &self.issuer)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("session_ttl", &self.session_ttl)
            .finish_non_exhaustive()
    }
}

/// Result of a successful token pair generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token (flag 0).
    pub access_token: String,
    /// Refresh token (flag 1).
    pub refresh_token: String,
    /// Access token expiration timestamp.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration timestamp.
    pub refresh_expires_at: DateTime<Utc>,
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.jwt_issuer.clone(),
            access_ttl: Duration::hours(config.access_ttl_hours),
            refresh_ttl: Duration::days(config.refresh_ttl_days),
            session_ttl: Duration::seconds(config.session_ttl_seconds),
        }
    }

    /// Issues an access token (flag 0) valid for `ttl`.
    pub fn issue_access(&self, user_id: UserId, ttl: Duration) -> Result<String, TokenError> {
        self.issue_class_at(user_id, TokenClass::Access, Utc::now(), ttl)
    }

    /// Issues a refresh token (flag 1) valid for `ttl`.
    pub fn issue_refresh(&self, user_id: UserId, ttl: Duration) -> Result<String, TokenError> {
        self.issue_class_at(user_id, TokenClass::Refresh, Utc::now(), ttl)
    }

    /// Issues an access + refresh pair with the configured default lifetimes.
    pub fn issue_pair(&self, user_id: UserId) -> Result<TokenPair, TokenError> {
        let now = Utc::now();
        let access = AccessClaims::new(user_id, TokenClass::Access, &self.issuer, now, self.access_ttl);
        let refresh =
            AccessClaims::new(user_id, TokenClass::Refresh, &self.issuer, now, self.refresh_ttl);

        Ok(TokenPair {
            access_token: self.sign(&access)?,
            refresh_token: self.sign(&refresh)?,
            access_expires_at: now + self.access_ttl,
            refresh_expires_at: now + self.refresh_ttl,
        })
    }

    /// Issues a legacy session token for `user` valid for `ttl`.
    pub fn issue_session(&self, user: &User, ttl: Duration) -> Result<String, TokenError> {
        self.sign(&SessionClaims::for_user(user, Utc::now(), ttl))
    }

    /// Issues a legacy session token with the configured default lifetime.
    pub fn issue_default_session(&self, user: &User) -> Result<String, TokenError> {
        self.issue_session(user, self.session_ttl)
    }

    /// Issues an access or refresh token as if the clock read `issued_at`.
    pub fn issue_class_at(
        &self,
        user_id: UserId,
        class: TokenClass,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let claims = AccessClaims::new(user_id, class, &self.issuer, issued_at, ttl);
        self.sign(&claims)
    }

    /// Signs an arbitrary claim set with the configured key.
    pub fn sign<C: Serialize>(&self, claims: &C) -> Result<String, TokenError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// The configured `iss` claim.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Default access token lifetime.
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Default legacy session token lifetime.
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }
}
