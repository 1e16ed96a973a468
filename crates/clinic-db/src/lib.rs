//! Clinic Database — SurrealDB connection management and the concrete
//! collaborators behind the session synchronizer.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - The local identity provider ([`SurrealIdentityProvider`])
//! - Profile and patient stores ([`repository`])
//! - Error types ([`DbError`])

mod connection;
mod error;
mod identity;
mod password;
mod schema;
mod token;

pub mod repository;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use identity::{IdentityConfig, MAX_SESSION_LIFETIME_SECS, SurrealIdentityProvider};
pub use password::verify_password;
pub use schema::{run_migrations, schema_v1};
