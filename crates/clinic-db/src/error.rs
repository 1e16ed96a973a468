//! Database-specific error types and conversions.

use clinic_core::error::ClinicError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Malformed row: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for ClinicError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ClinicError::NotFound { entity, id },
            DbError::Crypto(msg) => ClinicError::Crypto(msg),
            other => ClinicError::Database(other.to_string()),
        }
    }
}
