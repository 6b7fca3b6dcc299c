//! Salted password digests.
//!
//! Each account stores a digest together with the salt used to produce it.
//! Verification recomputes the digest from the supplied password and the
//! stored salt, then compares the encodings in constant time. A fresh salt is
//! minted only when a password is set, never on login.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHasher};
use subtle::ConstantTimeEq;

use super::user::StoredPassword;

/// Failures raised while deriving a digest.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    /// The stored salt could not be decoded.
    #[error("stored password salt is malformed: {message}")]
    MalformedSalt {
        /// Decoder message.
        message: String,
    },
    /// The hashing primitive rejected its inputs.
    #[error("password hashing failed: {message}")]
    Hashing {
        /// Hasher message.
        message: String,
    },
}

/// Derive the digest of `password` under an existing encoded `salt`.
///
/// Deterministic for a given `(password, salt)` pair.
pub fn digest_with_salt(password: &str, salt: &str) -> Result<String, PasswordError> {
    let salt = SaltString::from_b64(salt).map_err(|err| PasswordError::MalformedSalt {
        message: err.to_string(),
    })?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| PasswordError::Hashing {
            message: err.to_string(),
        })?;
    Ok(hash.to_string())
}

/// Mint a fresh salt and digest for a password being set.
pub fn hash_new_password(password: &str) -> Result<StoredPassword, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = digest_with_salt(password, salt.as_str())?;
    Ok(StoredPassword {
        hash,
        salt: salt.as_str().to_owned(),
    })
}

/// Check `password` against a stored digest.
///
/// Returns `Ok(false)` on mismatch; errors only when the stored salt is
/// unusable.
pub fn verify_password(password: &str, stored: &StoredPassword) -> Result<bool, PasswordError> {
    let candidate = digest_with_salt(password, &stored.salt)?;
    Ok(candidate.as_bytes().ct_eq(stored.hash.as_bytes()).into())
}
