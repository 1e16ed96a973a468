//! Staff profile domain model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ClinicError, ClinicResult};

/// Staff roles. Stored and displayed in lowercase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Dentist,
    Assistant,
    Receptionist,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Admin,
        Role::Dentist,
        Role::Assistant,
        Role::Receptionist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Dentist => "dentist",
            Role::Assistant => "assistant",
            Role::Receptionist => "receptionist",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "dentist" => Ok(Role::Dentist),
            "assistant" => Ok(Role::Assistant),
            "receptionist" => Ok(Role::Receptionist),
            other => Err(ClinicError::Validation {
                message: format!("unknown role: {other}"),
            }),
        }
    }
}

/// Authorization profile of a staff member, keyed by identity id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub identity_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfile {
    pub identity_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Outcome of a profile lookup.
///
/// Callers must handle the three cases separately: a missing profile
/// and an unreachable store lead to different repairs.
#[derive(Debug)]
pub enum ProfileLookup {
    Found(Profile),
    Absent,
    Error(ClinicError),
}

impl From<ClinicResult<Option<Profile>>> for ProfileLookup {
    fn from(result: ClinicResult<Option<Profile>>) -> Self {
        match result {
            Ok(Some(profile)) => ProfileLookup::Found(profile),
            Ok(None) => ProfileLookup::Absent,
            Err(err) => ProfileLookup::Error(err),
        }
    }
}
