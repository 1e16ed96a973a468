//! SurrealDB repository implementations.

mod patient;
mod profile;

pub use patient::SurrealPatientRepository;
pub use profile::SurrealProfileStore;

use surrealdb_types::SurrealValue;

/// Row struct for `count() ... GROUP ALL` queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub(crate) total: u64,
}
