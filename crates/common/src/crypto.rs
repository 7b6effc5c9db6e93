//! Password hashing and cookie signing key material.
//!
//! Passwords are stored as Argon2id PHC strings. Session cookies are signed
//! with a key derived from the configured secret.
//!
//! # Examples
//!
//! ```
//! use tweeter_common::crypto::{hash_password, verify_password};
//!
//! let digest = hash_password("secret1").expect("hashing failed");
//! assert!(verify_password("secret1", &digest).expect("bad digest"));
//! assert!(!verify_password("secret2", &digest).expect("bad digest"));
//! ```

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sha2::{Digest, Sha512};

use crate::{AppError, AppResult};

/// Shortest secret accepted for deriving the cookie signing key.
pub const MIN_SECRET_LEN: usize = 32;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a stored hash.
///
/// Returns `Ok(false)` on mismatch; an unparsable digest is an internal error.
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Derive 64 bytes of signing key material from the configured secret.
pub fn derive_signing_key(secret: &str) -> AppResult<[u8; 64]> {
    if secret.len() < MIN_SECRET_LEN {
        return Err(AppError::Config(format!(
            "session.secret must be at least {MIN_SECRET_LEN} bytes"
        )));
    }

    let digest = Sha512::digest(secret.as_bytes());
    let mut key = [0u8; 64];
    key.copy_from_slice(&digest);
    Ok(key)
}
