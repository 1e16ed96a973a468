//! Argon2id password hashing for identity accounts.
//!
//! Hashing uses OWASP-recommended parameters (m=19 MiB, t=2, p=1) with a
//! random salt per hash. An optional pepper is prepended to the password
//! in both directions.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::error::DbError;

fn with_pepper<'a>(password: &'a str, pepper: Option<&str>, buf: &'a mut String) -> &'a [u8] {
    match pepper {
        Some(p) => {
            *buf = format!("{p}{password}");
            buf.as_bytes()
        }
        None => password.as_bytes(),
    }
}

pub(crate) fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, DbError> {
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| DbError::Crypto(format!("argon2 params error: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let mut buf = String::new();
    let input = with_pepper(password, pepper, &mut buf);
    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);

    argon2
        .hash_password(input, &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DbError::Crypto(format!("password hash error: {e}")))
}

/// Verify a password against a stored PHC-format hash.
///
/// `Ok(false)` on mismatch; `Err` only if the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str, pepper: Option<&str>) -> Result<bool, DbError> {
    let mut buf = String::new();
    let input = with_pepper(password, pepper, &mut buf);

    let parsed = argon2::PasswordHash::new(hash)
        .map_err(|e| DbError::Decode(format!("invalid hash format: {e}")))?;

    match Argon2::default().verify_password(input, &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(DbError::Crypto(format!("verify error: {e}"))),
    }
}
