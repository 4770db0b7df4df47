//! Argon2id password hashing and verification.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use deptadmin_core::error::AppError;

/// Checks submitted secrets against stored salted digests using Argon2id.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Creates a new password hasher instance.
    pub fn new() -> Self {
        Self
    }

    /// Hashes a plaintext password with a random salt into a PHC string.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored Argon2id hash.
    ///
    /// Returns `Ok(false)` on mismatch. A digest that cannot be parsed is an
    /// internal error, never a silent `false`.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deptadmin_core::error::ErrorKind;

    #[test]
    fn test_hash_then_verify() {
        let hasher = PasswordHasher::new();
        let digest = hasher.hash_password("admin123").unwrap();

        assert!(digest.starts_with("$argon2id$"));
        assert!(!digest.contains("admin123"));
        assert!(hasher.verify_password("admin123", &digest).unwrap());
        assert!(!hasher.verify_password("admin124", &digest).unwrap());
    }

    #[test]
    fn test_same_secret_gets_distinct_salts() {
        let hasher = PasswordHasher::new();
        let a = hasher.hash_password("admin123").unwrap();
        let b = hasher.hash_password("admin123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_garbage_digest_is_an_error() {
        let err = PasswordHasher::new()
            .verify_password("admin123", "plaintext-in-the-db")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
    }
}
