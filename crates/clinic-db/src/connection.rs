//! SurrealDB connection management.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;
use crate::schema::run_migrations;

/// Where the panel's records live.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket address (e.g., `127.0.0.1:8000`).
    pub url: String,
    /// Namespace holding the panel's database.
    pub namespace: String,
    /// Database with the identity, session, profile and patient tables.
    pub database: String,
    /// Root user the server signs in as.
    pub username: String,
    /// Password for `username`.
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "clinic".into(),
            database: "panel".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// Owns the connection shared by the identity provider and the stores.
///
/// Cloning is cheap; every clone talks to the same server session.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Connect as root, select namespace and database, then bring the
    /// schema up to date.
    pub async fn open(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to SurrealDB"
        );

        let db = Surreal::new::<Ws>(config.url.as_str()).await?;
        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;
        db.use_ns(config.namespace.as_str())
            .use_db(config.database.as_str())
            .await?;

        run_migrations(&db).await?;
        info!("SurrealDB ready");

        Ok(Self { db })
    }

    /// Handle to pass into the repositories (clones share the session).
    pub fn client(&self) -> Surreal<Client> {
        self.db.clone()
    }
}
