use crate::error::AppError;
use bcrypt::{hash, verify, DEFAULT_COST};

/// Hashes a plaintext password with bcrypt.
///
/// bcrypt embeds a fresh random salt in every hash, so two calls on the same
/// password produce different outputs. The plaintext is never stored or
/// logged anywhere.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    Ok(hash(password, DEFAULT_COST)?)
}

/// Verifies a plaintext password against a stored bcrypt hash.
///
/// The underlying comparison is constant-time. A malformed or corrupt hash is
/// treated as a verification failure rather than an error: from the caller's
/// point of view the password simply does not match.
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    verify(password, hashed_password).unwrap_or(false)
}
