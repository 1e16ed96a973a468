//! Repository trait definitions for data access abstraction.
//!
//! All operations are async. Implementations are shared, externally
//! synchronized resources: callers never assume exclusive access and
//! never cache results across calls.

use uuid::Uuid;

use crate::error::ClinicResult;
use crate::models::patient::{CreatePatient, Patient, UpdatePatient};
use crate::models::profile::{CreateProfile, Profile, Role};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Staff profiles
// ---------------------------------------------------------------------------

pub trait ProfileStore: Send + Sync {
    /// `Ok(None)` when no profile exists for the identity.
    fn get_by_identity_id(
        &self,
        identity_id: Uuid,
    ) -> impl Future<Output = ClinicResult<Option<Profile>>> + Send;
    fn insert(&self, input: CreateProfile) -> impl Future<Output = ClinicResult<Profile>> + Send;
    fn update_role(
        &self,
        identity_id: Uuid,
        role: Role,
    ) -> impl Future<Output = ClinicResult<Profile>> + Send;
    /// Newest profiles first.
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = ClinicResult<PaginatedResult<Profile>>> + Send;
    fn count(&self) -> impl Future<Output = ClinicResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Patients
// ---------------------------------------------------------------------------

pub trait PatientRepository: Send + Sync {
    fn create(&self, input: CreatePatient) -> impl Future<Output = ClinicResult<Patient>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = ClinicResult<Patient>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdatePatient,
    ) -> impl Future<Output = ClinicResult<Patient>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = ClinicResult<()>> + Send;
    /// Newest patients first.
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = ClinicResult<PaginatedResult<Patient>>> + Send;
    fn count(&self) -> impl Future<Output = ClinicResult<u64>> + Send;
}
