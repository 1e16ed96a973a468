//! Clinic Core — domain models, the shared error type, and the
//! collaborator traits consumed by the session synchronizer.

pub mod error;
pub mod identity;
pub mod models;
pub mod repository;

pub use error::{ClinicError, ClinicResult};
