//! Schema definitions and migration runner for SurrealDB.
//!
//! Tables are SCHEMAFULL. UUIDs are record keys or strings; roles are
//! strings guarded by an ASSERT.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Identity provider: accounts and persisted sessions
-- =======================================================================
DEFINE TABLE identity SCHEMAFULL;
DEFINE FIELD email ON TABLE identity TYPE string;
DEFINE FIELD password_hash ON TABLE identity TYPE string;
DEFINE FIELD created_at ON TABLE identity TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_identity_email ON TABLE identity COLUMNS email UNIQUE;

DEFINE TABLE auth_session SCHEMAFULL;
DEFINE FIELD identity_id ON TABLE auth_session TYPE string;
DEFINE FIELD token_hash ON TABLE auth_session TYPE string;
DEFINE FIELD expires_at ON TABLE auth_session TYPE datetime;
DEFINE FIELD created_at ON TABLE auth_session TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_auth_session_token ON TABLE auth_session \
    COLUMNS token_hash UNIQUE;
DEFINE INDEX idx_auth_session_identity ON TABLE auth_session \
    COLUMNS identity_id;

-- =======================================================================
-- Staff profiles (record key = identity id)
-- =======================================================================
DEFINE TABLE staff_profile SCHEMAFULL;
DEFINE FIELD name ON TABLE staff_profile TYPE string;
DEFINE FIELD email ON TABLE staff_profile TYPE string;
DEFINE FIELD role ON TABLE staff_profile TYPE string \
    ASSERT $value IN ['admin', 'dentist', 'assistant', 'receptionist'];
DEFINE FIELD created_at ON TABLE staff_profile TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE staff_profile TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Patients
-- =======================================================================
DEFINE TABLE patient SCHEMAFULL;
DEFINE FIELD first_name ON TABLE patient TYPE string;
DEFINE FIELD last_name ON TABLE patient TYPE string;
DEFINE FIELD email ON TABLE patient TYPE option<string>;
DEFINE FIELD phone ON TABLE patient TYPE option<string>;
DEFINE FIELD address ON TABLE patient TYPE option<string>;
DEFINE FIELD created_at ON TABLE patient TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_patient_created ON TABLE patient COLUMNS created_at;
";

/// Apply every migration newer than the recorded schema version.
///
/// Safe to call on every start: the tracking table is created
/// idempotently and applied versions are skipped.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS
        .iter()
        .filter(|m| m.version > current_version)
    {
        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "v{} '{}' failed: {e}",
                migration.version, migration.name
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "could not record v{}: {e}",
                    migration.version
                ))
            })?;
    }

    Ok(())
}

/// Raw DDL for version 1, for tests that bypass the runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
