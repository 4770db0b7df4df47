//! JWT token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::de::DeserializeOwned;
use tracing::debug;

use deptadmin_core::config::AuthConfig;

use super::claims::{AccessClaims, SessionClaims};
use super::error::TokenError;

/// Validates HS256 tokens against the configured secret.
///
/// Expiry is checked with the configured leeway. Access and refresh tokens
/// must also carry the configured issuer.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    access_validation: Validation,
    session_validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("access_validation", &self.access_validation)
            .field("session_validation", &self.session_validation)
            .finish_non_exhaustive()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut access_validation = Validation::new(Algorithm::HS256);
        access_validation.leeway = config.leeway_seconds;
        access_validation.set_issuer(&[config.jwt_issuer.as_str()]);
        access_validation.set_required_spec_claims(&["exp", "iss"]);

        let mut session_validation = Validation::new(Algorithm::HS256);
        session_validation.leeway = config.leeway_seconds;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_validation,
            session_validation,
        }
    }

    /// Decodes an access or refresh token. The class flag is returned as-is;
    /// callers decide which classes they accept.
    pub fn decode_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        self.decode_with(token, &self.access_validation)
            .inspect_err(|e| debug!(error = %e, "Access token rejected"))
    }

    /// Decodes a legacy session token.
    pub fn decode_session(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.decode_with(token, &self.session_validation)
            .inspect_err(|e| debug!(error = %e, "Session token rejected"))
    }

    fn decode_with<C: DeserializeOwned>(
        &self,
        token: &str,
        validation: &Validation,
    ) -> Result<C, TokenError> {
        let data = decode::<C>(token, &self.decoding_key, validation)?;
        Ok(data.claims)
    }
}
