//! Argon2 PHC helpers for `UserModel::check_password` implementations.

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};

use crate::error::AuthError;

fn backend<E: std::fmt::Display>(e: E) -> AuthError { AuthError::backend(format!("password hashing: {}", e)) }

/// Hash `password` with Argon2id default parameters and a fresh 128-bit salt.
///
/// Returns the PHC string (`$argon2id$v=19$m=...,t=...,p=...$<salt>$<hash>`), which carries
/// its own parameters and salt and is all `verify_password` needs.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let mut salt = [0u8; 16];
    getrandom::getrandom(&mut salt).map_err(backend)?;
    let salt = SaltString::encode_b64(&salt).map_err(backend)?;
    Argon2::default().hash_password(password.as_bytes(), &salt).map(|h| h.to_string()).map_err(backend)
}

/// False on mismatch and on an unparsable hash alike.
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}
