//! SurrealDB implementation of [`ProfileStore`].
//!
//! Profiles are keyed by identity id (`staff_profile:<uuid>`), so a
//! second insert for the same identity fails instead of duplicating.

use chrono::{DateTime, Utc};
use clinic_core::error::ClinicResult;
use clinic_core::models::profile::{CreateProfile, Profile, Role};
use clinic_core::repository::{PaginatedResult, Pagination, ProfileStore};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::CountRow;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ProfileRow {
    name: String,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ProfileRowWithId {
    record_id: String,
    name: String,
    email: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_role(s: &str) -> Result<Role, DbError> {
    s.parse()
        .map_err(|_| DbError::Decode(format!("unknown role: {s}")))
}

impl ProfileRow {
    fn into_profile(self, identity_id: Uuid) -> Result<Profile, DbError> {
        Ok(Profile {
            identity_id,
            role: parse_role(&self.role)?,
            name: self.name,
            email: self.email,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl ProfileRowWithId {
    fn try_into_profile(self) -> Result<Profile, DbError> {
        let identity_id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid identity UUID: {e}")))?;
        ProfileRow {
            name: self.name,
            email: self.email,
            role: self.role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_profile(identity_id)
    }
}

/// SurrealDB-backed staff profile store.
#[derive(Clone)]
pub struct SurrealProfileStore<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProfileStore<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ProfileStore for SurrealProfileStore<C> {
    async fn get_by_identity_id(&self, identity_id: Uuid) -> ClinicResult<Option<Profile>> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('staff_profile', $id)")
            .bind(("id", identity_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_profile(identity_id)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, input: CreateProfile) -> ClinicResult<Profile> {
        let id_str = input.identity_id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('staff_profile', $id) SET \
                 name = $name, email = $email, role = $role",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("email", input.email))
            .bind(("role", input.role.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "staff_profile".into(),
            id: id_str,
        })?;

        Ok(row.into_profile(input.identity_id)?)
    }

    async fn update_role(&self, identity_id: Uuid, role: Role) -> ClinicResult<Profile> {
        let id_str = identity_id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('staff_profile', $id) \
                 SET role = $role, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("role", role.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "staff_profile".into(),
            id: id_str,
        })?;

        Ok(row.into_profile(identity_id)?)
    }

    async fn list(&self, pagination: Pagination) -> ClinicResult<PaginatedResult<Profile>> {
        let total = self.count().await?;

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM staff_profile \
                 ORDER BY created_at DESC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfileRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(ProfileRowWithId::try_into_profile)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn count(&self) -> ClinicResult<u64> {
        let mut result = self
            .db
            .query("SELECT count() AS total FROM staff_profile GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
