//! Staff administration: listing profiles and editing roles.
//!
//! Writes go straight to the shared profile store. Other live sessions
//! observe a role change on their next session-change event.

use std::sync::Arc;

use clinic_core::models::profile::{Profile, Role};
use clinic_core::models::user::ResolvedUser;
use clinic_core::repository::{PaginatedResult, Pagination, ProfileStore};
use tracing::info;
use uuid::Uuid;

use crate::error::AuthError;
use crate::route::Route;

pub struct StaffDirectory<P> {
    store: Arc<P>,
}

impl<P: ProfileStore> StaffDirectory<P> {
    pub fn new(store: Arc<P>) -> Self {
        Self { store }
    }

    fn require_staff_access(actor: &ResolvedUser) -> Result<(), AuthError> {
        if Route::Staff.permits(actor.role) {
            Ok(())
        } else {
            Err(AuthError::Forbidden {
                reason: "you must be an administrator to manage staff".into(),
            })
        }
    }

    /// Staff profiles, newest first.
    pub async fn list(
        &self,
        actor: &ResolvedUser,
        pagination: Pagination,
    ) -> Result<PaginatedResult<Profile>, AuthError> {
        Self::require_staff_access(actor)?;
        self.store
            .list(pagination)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))
    }

    pub async fn update_role(
        &self,
        actor: &ResolvedUser,
        identity_id: Uuid,
        role: Role,
    ) -> Result<Profile, AuthError> {
        Self::require_staff_access(actor)?;
        let profile = self
            .store
            .update_role(identity_id, role)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        info!(
            actor = %actor.identity_id,
            identity_id = %identity_id,
            role = %role,
            "Staff role updated"
        );
        Ok(profile)
    }

    /// Number of staff profiles; visible to every signed-in user.
    pub async fn count(&self) -> Result<u64, AuthError> {
        self.store
            .count()
            .await
            .map_err(|e| AuthError::Store(e.to_string()))
    }
}
