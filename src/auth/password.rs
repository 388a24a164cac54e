//! Password hashing and verification using Argon2id.
//!
//! Hashes are stored in PHC string format, so the algorithm identifier
//! and cost parameters travel with the hash and the cost factor can be
//! raised later without a format break.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::auth::error::AuthError;

/// Hash a raw password with a fresh random salt.
pub fn hash(raw: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(raw.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthError::Crypto(format!("password hash: {err}")))
}

/// Verify a raw password against a stored PHC-format hash.
///
/// Returns `false` on mismatch and on a malformed stored hash; a broken
/// row must read as a failed login, never as a crash.
#[must_use]
pub fn verify(raw: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(raw.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_matches() {
        let stored = hash("Passw0rd!").unwrap();
        assert!(verify("Passw0rd!", &stored));
    }

    #[test]
    fn wrong_password_does_not_match() {
        let stored = hash("Passw0rd!").unwrap();
        assert!(!verify("password", &stored));
    }

    #[test]
    fn hash_is_salted() {
        let first = hash("Secret1!").unwrap();
        let second = hash("Secret1!").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn hash_never_equals_plaintext() {
        let stored = hash("Secret1!").unwrap();
        assert_ne!(stored, "Secret1!");
        assert!(stored.starts_with("$argon2"));
    }

    #[test]
    fn malformed_stored_hash_reads_as_mismatch() {
        assert!(!verify("anything", "not-a-phc-hash"));
        assert!(!verify("anything", ""));
    }
}
