//! Password hashing primitives
//!
//! One-way hash and comparison, nothing else. The rest of the crate treats
//! password hashes as opaque strings.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use thiserror::Error;

/// Error type for password hashing operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HashError {
    /// Hashing failed
    #[error("Hash failed: {0}")]
    HashFailed(String),
}

/// Hash a password using Argon2id with a fresh random salt
pub fn hash_password(password: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| HashError::HashFailed(e.to_string()))
}

/// Verify a password against a stored hash
///
/// A malformed stored hash verifies as `false` rather than erroring; the
/// caller only ever learns match / no match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test 1: hash_password produces an argon2id hash
    #[test]
    fn test_hash_is_argon2id() {
        let hash = hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$argon2id$"));
    }

    // Test 2: Same password hashes differently (random salt)
    #[test]
    fn test_salts_are_unique() {
        let first = hash_password("hunter2").unwrap();
        let second = hash_password("hunter2").unwrap();
        assert_ne!(first, second);
    }

    // Test 3: Correct password verifies
    #[test]
    fn test_verify_success() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash));
    }

    // Test 4: Wrong password fails
    #[test]
    fn test_verify_wrong_password() {
        let hash = hash_password("hunter2").unwrap();
        assert!(!verify_password("swordfish", &hash));
    }

    // Test 5: Malformed stored hash fails closed
    #[test]
    fn test_verify_malformed_hash() {
        assert!(!verify_password("hunter2", "not_a_valid_hash"));
    }
}
