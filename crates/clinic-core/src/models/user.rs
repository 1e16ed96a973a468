//! Resolved (authorized) user model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::profile::{Profile, Role};
use crate::models::session::Session;

/// A live session joined with its staff profile.
///
/// Only ever built from both halves; there is no partial or default
/// user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedUser {
    pub identity_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl ResolvedUser {
    /// Email comes from the session, name and role from the profile.
    pub fn resolve(session: &Session, profile: Profile) -> Self {
        Self {
            identity_id: session.identity_id,
            email: session.email.clone(),
            name: profile.name,
            role: profile.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
