//! Clinic Server — application entry point.
//!
//! Connects the SurrealDB-backed identity provider and profile store to a
//! session synchronizer and logs what the panel would render for every
//! published state until Ctrl-C.

mod config;
mod dashboard;

use std::sync::Arc;

use anyhow::Context;
use clinic_auth::{
    AuthError, AuthState, Navigator, Route, SessionSynchronizer, StaffDirectory, admit, navigation,
};
use clinic_core::models::profile::Role;
use clinic_core::repository::{PatientRepository, ProfileStore};
use clinic_db::repository::{SurrealPatientRepository, SurrealProfileStore};
use clinic_db::{DbManager, SurrealIdentityProvider};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{SeedAdmin, ServerConfig};

/// Routes probed against the gate on every state change.
const PROBED_ROUTES: [Route; 6] = [
    Route::Login,
    Route::Register,
    Route::Dashboard,
    Route::Staff,
    Route::Patients,
    Route::Settings,
];

/// Headless stand-in for the browser router.
struct LoggingNavigator;

impl Navigator for LoggingNavigator {
    fn navigate(&self, route: Route) {
        info!(path = route.path(), "Navigate");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("clinic=info".parse()?))
        .json()
        .init();

    info!("Starting clinic server...");

    let db = DbManager::open(&config.db)
        .await
        .context("could not open the database")?;

    let provider = Arc::new(SurrealIdentityProvider::new(
        db.client(),
        config.identity.clone(),
    ));
    let store = Arc::new(SurrealProfileStore::new(db.client()));
    let patients = SurrealPatientRepository::new(db.client());
    let directory = StaffDirectory::new(Arc::clone(&store));

    let sync = SessionSynchronizer::start(
        Arc::clone(&provider),
        Arc::clone(&store),
        Arc::new(LoggingNavigator),
        config.auth.clone(),
    );
    let initial = sync.wait_until_loaded().await;
    let mut states = sync.watch();
    report(&initial, &patients, &directory).await;

    if let Some(seed) = &config.seed_admin {
        seed_admin(&sync, store.as_ref(), seed).await?;
    }

    if let Some(token) = &config.session_token {
        match provider.restore_session(token).await {
            Ok(Some(session)) => info!(identity_id = %session.identity_id, "Resumed persisted session"),
            Ok(None) => warn!("CLINIC_SESSION_TOKEN does not match a live session"),
            Err(e) => warn!(error = %e, "Could not resume persisted session"),
        }
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                result.context("could not listen for Ctrl-C")?;
                break;
            }
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow_and_update().clone();
                report(&state, &patients, &directory).await;
            }
        }
    }

    info!("Shutting down...");
    sync.shutdown().await;
    info!("Clinic server stopped.");
    Ok(())
}

/// Create the first administrator if the account does not exist yet.
///
/// Registration always grants the default role, so the new profile is
/// promoted directly through the store.
async fn seed_admin<I, P>(
    sync: &SessionSynchronizer<I, P>,
    store: &P,
    seed: &SeedAdmin,
) -> anyhow::Result<()>
where
    I: clinic_core::identity::IdentityProvider + 'static,
    P: ProfileStore + 'static,
{
    match sync.register(&seed.name, &seed.email, &seed.password).await {
        Ok(profile) => {
            store
                .update_role(profile.identity_id, Role::Admin)
                .await
                .context("could not promote the seeded administrator")?;
            info!(identity_id = %profile.identity_id, "Seeded administrator account");
            Ok(())
        }
        Err(AuthError::SignUp(reason)) => {
            info!(reason = %reason, "Administrator seed skipped");
            Ok(())
        }
        Err(e) => Err(e).context("could not seed the administrator account"),
    }
}

async fn report<R, P>(state: &AuthState, patients: &R, directory: &StaffDirectory<P>)
where
    R: PatientRepository,
    P: ProfileStore,
{
    match &state.user {
        Some(user) => info!(
            identity_id = %user.identity_id,
            email = %user.email,
            name = %user.name,
            role = %user.role,
            loading = state.loading,
            "Auth state"
        ),
        None => info!(loading = state.loading, "Auth state: anonymous"),
    }

    for route in PROBED_ROUTES {
        info!(path = route.path(), admission = ?admit(state, route), "Gate");
    }

    let Some(user) = &state.user else {
        return;
    };
    let entries: Vec<&str> = navigation(Some(user))
        .iter()
        .map(|entry| entry.label)
        .collect();
    info!(entries = ?entries, "Sidebar");

    match dashboard::summarize(patients, directory).await {
        Ok(summary) => info!(
            name = %user.name,
            patient_count = summary.patient_count,
            staff_count = summary.staff_count,
            "Dashboard"
        ),
        Err(e) => error!(error = %e, "Dashboard summary unavailable"),
    }
}
