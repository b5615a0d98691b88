// Password hashing and verification

use bcrypt::{hash, verify, DEFAULT_COST};

/// bcrypt only considers the first 72 bytes of its input. Oversized
/// passwords are rejected outright instead of silently truncated, on both
/// the hashing and the verification path.
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password must not exceed 72 bytes when UTF-8 encoded")]
    TooLong,

    #[error("password hash error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

/// Hash a password using bcrypt. The result is self-salted; hashing the same
/// input twice yields different strings.
pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    if plain.len() > MAX_PASSWORD_BYTES {
        return Err(PasswordError::TooLong);
    }
    Ok(hash(plain, DEFAULT_COST)?)
}

/// Verify a password against a stored hash. Applies the same 72-byte cap as
/// hashing so a truncation-prone password is never reported as valid.
pub fn verify_password(plain: &str, hashed: &str) -> Result<bool, PasswordError> {
    if plain.len() > MAX_PASSWORD_BYTES {
        return Err(PasswordError::TooLong);
    }
    Ok(verify(plain, hashed)?)
}
