/// Password hashing and verification using Argon2id
use crate::error::{AppError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a password using Argon2id with a fresh random salt.
///
/// Two calls on the same input produce different PHC strings; equality of
/// hashes is never part of the contract, only `verify_password`.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against its stored hash.
///
/// A malformed stored digest verifies as `false` rather than erroring, so
/// callers can treat every non-match uniformly as invalid credentials.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(password_hash) {
        Ok(hash) => hash,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "correct horse battery staple";
        let hash = hash_password(password).expect("should hash password");
        assert!(verify_password(password, &hash));
    }

    #[test]
    fn wrong_password_fails() {
        let hash = hash_password("right-password").expect("should hash password");
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn malformed_digest_verifies_false_without_error() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", ""));
    }

    #[test]
    fn same_password_hashes_differently() {
        let hash1 = hash_password("repeatable").expect("should hash");
        let hash2 = hash_password("repeatable").expect("should hash");
        // Different salts produce different digests
        assert_ne!(hash1, hash2);
        assert!(verify_password("repeatable", &hash1));
        assert!(verify_password("repeatable", &hash2));
    }
}
