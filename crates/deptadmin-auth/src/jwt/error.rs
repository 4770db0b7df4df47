//! Token decode and encode failures.

use thiserror::Error;

/// Why a token could not be issued or accepted.
///
/// Decode failures are kept apart for diagnosis; the request gate collapses
/// all of them into a single authentication failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The `exp` claim has elapsed beyond the configured leeway.
    #[error("token has expired")]
    Expired,

    /// The signature does not match the configured secret.
    #[error("invalid token signature")]
    InvalidSignature,

    /// Bad structure, encoding, claim set, class flag or issuer.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// Signing failed.
    #[error("failed to encode token: {0}")]
    Encoding(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match e.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidIssuer => Self::Malformed("issuer mismatch".to_string()),
            _ => Self::Malformed(e.to_string()),
        }
    }
}
