//! Error types shared by every clinic crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClinicError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Identity provider error: {0}")]
    IdentityProvider(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ClinicResult<T> = Result<T, ClinicError>;
