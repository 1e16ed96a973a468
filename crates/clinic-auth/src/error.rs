//! Errors returned to callers of explicit user actions.

use clinic_core::error::ClinicError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid login credentials")]
    InvalidCredentials,

    #[error("password should be at least {min_length} characters long")]
    WeakPassword { min_length: usize },

    #[error("{0}")]
    Validation(String),

    #[error("sign-up failed: {0}")]
    SignUp(String),

    /// The identity exists but has no profile; sessions for it will be
    /// signed out until the profile is repaired.
    #[error("account created, profile failed for identity {identity_id}: {reason}")]
    PartialRegistration { identity_id: Uuid, reason: String },

    #[error("access denied: {reason}")]
    Forbidden { reason: String },

    #[error("profile store error: {0}")]
    Store(String),

    #[error("identity provider error: {0}")]
    Provider(String),
}

impl AuthError {
    /// Classify a failed sign-in.
    pub(crate) fn from_sign_in(err: ClinicError) -> Self {
        match err {
            ClinicError::InvalidCredentials => AuthError::InvalidCredentials,
            ClinicError::Validation { message } => AuthError::Validation(message),
            other => AuthError::Provider(other.to_string()),
        }
    }

    /// Classify a failed account creation.
    pub(crate) fn from_sign_up(err: ClinicError) -> Self {
        match err {
            ClinicError::AlreadyExists { .. } => {
                AuthError::SignUp("an account with this email already exists".into())
            }
            ClinicError::Validation { message } => AuthError::Validation(message),
            other => AuthError::SignUp(other.to_string()),
        }
    }
}

impl From<AuthError> for ClinicError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ClinicError::InvalidCredentials,
            AuthError::WeakPassword { .. } | AuthError::Validation(_) => ClinicError::Validation {
                message: err.to_string(),
            },
            AuthError::Store(msg) => ClinicError::Database(msg),
            AuthError::SignUp(_)
            | AuthError::PartialRegistration { .. }
            | AuthError::Provider(_) => ClinicError::IdentityProvider(err.to_string()),
            AuthError::Forbidden { .. } => ClinicError::Internal(err.to_string()),
        }
    }
}
