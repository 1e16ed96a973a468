//! SurrealDB implementation of [`PatientRepository`].

use chrono::{DateTime, Utc};
use clinic_core::error::ClinicResult;
use clinic_core::models::patient::{CreatePatient, Patient, UpdatePatient};
use clinic_core::repository::{PaginatedResult, Pagination, PatientRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::CountRow;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct PatientRow {
    first_name: String,
    last_name: String,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct PatientRowWithId {
    record_id: String,
    first_name: String,
    last_name: String,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    created_at: DateTime<Utc>,
}

impl PatientRow {
    fn into_patient(self, id: Uuid) -> Patient {
        Patient {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            created_at: self.created_at,
        }
    }
}

impl PatientRowWithId {
    fn try_into_patient(self) -> Result<Patient, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        Ok(Patient {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            created_at: self.created_at,
        })
    }
}

/// Blank optional fields are stored as NONE.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Clone)]
pub struct SurrealPatientRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPatientRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PatientRepository for SurrealPatientRepository<C> {
    async fn create(&self, input: CreatePatient) -> ClinicResult<Patient> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('patient', $id) SET \
                 first_name = $first_name, last_name = $last_name, \
                 email = $email, phone = $phone, address = $address",
            )
            .bind(("id", id_str.clone()))
            .bind(("first_name", input.first_name))
            .bind(("last_name", input.last_name))
            .bind(("email", non_blank(input.email)))
            .bind(("phone", non_blank(input.phone)))
            .bind(("address", non_blank(input.address)))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<PatientRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "patient".into(),
            id: id_str,
        })?;

        Ok(row.into_patient(id))
    }

    async fn get_by_id(&self, id: Uuid) -> ClinicResult<Patient> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('patient', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PatientRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "patient".into(),
            id: id_str,
        })?;

        Ok(row.into_patient(id))
    }

    async fn update(&self, id: Uuid, input: UpdatePatient) -> ClinicResult<Patient> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.first_name.is_some() {
            sets.push("first_name = $first_name");
        }
        if input.last_name.is_some() {
            sets.push("last_name = $last_name");
        }
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.phone.is_some() {
            sets.push("phone = $phone");
        }
        if input.address.is_some() {
            sets.push("address = $address");
        }
        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!(
            "UPDATE type::record('patient', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(first_name) = input.first_name {
            builder = builder.bind(("first_name", first_name));
        }
        if let Some(last_name) = input.last_name {
            builder = builder.bind(("last_name", last_name));
        }
        if let Some(email) = input.email {
            builder = builder.bind(("email", non_blank(email)));
        }
        if let Some(phone) = input.phone {
            builder = builder.bind(("phone", non_blank(phone)));
        }
        if let Some(address) = input.address {
            builder = builder.bind(("address", non_blank(address)));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<PatientRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "patient".into(),
            id: id_str,
        })?;

        Ok(row.into_patient(id))
    }

    async fn delete(&self, id: Uuid) -> ClinicResult<()> {
        self.db
            .query("DELETE type::record('patient', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> ClinicResult<PaginatedResult<Patient>> {
        let total = self.count().await?;

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM patient \
                 ORDER BY created_at DESC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PatientRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(PatientRowWithId::try_into_patient)
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
            .query("SELECT count() AS total FROM patient GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
