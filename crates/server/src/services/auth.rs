//! Password hashing helpers.
//!
//! Authentication and token issuance live outside this service; the core
//! only needs to hash passwords on account creation and for the
//! degraded-mode administrator seed, using Argon2id.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Password handling errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Password doesn't meet requirements.
    #[error("{0}")]
    WeakPassword(String),

    /// Password does not match the stored hash.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Hashing or hash parsing failed.
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Validate a password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` when the password is too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::Hash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on mismatch and
/// `AuthError::Hash` if the stored hash cannot be parsed.
pub fn verify_password(password: &str, password_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(password_hash).map_err(|e| AuthError::Hash(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = hash_password("still-waters-run-deep").unwrap();
        assert!(verify_password("still-waters-run-deep", &hash).is_ok());
    }

    #[test]
    fn test_wrong_password_fails_verification() {
        let hash = hash_password("still-waters-run-deep").unwrap();
        assert!(matches!(
            verify_password("wrong-password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("still-waters-run-deep").unwrap();
        let second = hash_password("still-waters-run-deep").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_short_password_is_rejected() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::Hash(_))
        ));
    }
}
