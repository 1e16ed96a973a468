//! Session synchronizer: keeps the published `{user, loading}` state in
//! line with the identity provider's session and the profile store.
//!
//! One synchronizer owns one subscription. Session-change events are
//! consumed strictly in order by a single task; the state it publishes
//! always reflects the most recent event:
//!
//! - no live session → anonymous
//! - live session, profile found → resolved user
//! - live session, profile absent (orphaned identity) → forced sign-out,
//!   then anonymous
//! - live session, store fault → anonymous (optionally signed out, see
//!   [`AuthConfig::sign_out_on_store_error`])
//!
//! A profile lookup still in flight when a newer event arrives is
//! abandoned and resolution restarts on the newer event. A forced
//! sign-out, once started, always completes.

use std::sync::Arc;

use clinic_core::identity::{IdentityProvider, Subscription};
use clinic_core::models::profile::{CreateProfile, Profile, ProfileLookup};
use clinic_core::models::session::{Session, SessionEvent};
use clinic_core::models::user::ResolvedUser;
use clinic_core::repository::ProfileStore;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::route::{Navigator, Route};

/// State published to views.
///
/// `loading` is true only until the first session-change event has been
/// processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<ResolvedUser>,
    pub loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

/// Owning handle to a running synchronizer.
///
/// Construct with [`SessionSynchronizer::start`] and release with
/// [`SessionSynchronizer::shutdown`]. Dropping the handle also stops the
/// processing task, which releases the provider subscription.
pub struct SessionSynchronizer<I, P> {
    provider: Arc<I>,
    store: Arc<P>,
    navigator: Arc<dyn Navigator>,
    config: AuthConfig,
    state: watch::Sender<AuthState>,
    shutdown: CancellationToken,
    worker: Option<JoinHandle<()>>,
}

impl<I, P> SessionSynchronizer<I, P>
where
    I: IdentityProvider + 'static,
    P: ProfileStore + 'static,
{
    /// Subscribe to the provider and start processing events.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(
        provider: Arc<I>,
        store: Arc<P>,
        navigator: Arc<dyn Navigator>,
        config: AuthConfig,
    ) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        let shutdown = CancellationToken::new();
        let subscription = provider.subscribe();

        let worker = Worker {
            provider: Arc::clone(&provider),
            store: Arc::clone(&store),
            state: state.clone(),
            sign_out_on_store_error: config.sign_out_on_store_error,
        };
        let handle = tokio::spawn(worker.run(subscription, shutdown.clone()));
        info!("Session synchronizer started");

        Self {
            provider,
            store,
            navigator,
            config,
            state,
            shutdown,
            worker: Some(handle),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Receiver observing every published state.
    pub fn watch(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Wait until the first session-change event has been processed.
    pub async fn wait_until_loaded(&self) -> AuthState {
        let mut rx = self.state.subscribe();
        match rx.wait_for(|s| !s.loading).await {
            Ok(state) => state.clone(),
            // Sender lives in `self`; unreachable while borrowed.
            Err(_) => self.state(),
        }
    }

    /// Password sign-in. State changes only through the resulting
    /// session-change event.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AuthError> {
        match self.provider.sign_in_with_password(email, password).await {
            Ok(session) => {
                debug!(identity_id = %session.identity_id, "Sign-in accepted by provider");
                Ok(())
            }
            Err(err) => {
                let err = AuthError::from_sign_in(err);
                if !matches!(err, AuthError::InvalidCredentials) {
                    warn!(error = %err, "Sign-in failed");
                }
                Err(err)
            }
        }
    }

    /// Sign out, then clear the user and leave for the login page without
    /// waiting for the confirming event.
    pub async fn logout(&self) {
        if let Err(e) = self.provider.sign_out().await {
            warn!(error = %e, "Provider sign-out failed; clearing local state anyway");
        }
        self.state.send_modify(|s| s.user = None);
        self.navigator.navigate(Route::Login);
    }

    /// Create the identity account, then its profile with the default
    /// role.
    ///
    /// An identity whose profile insert failed is not rolled back; the
    /// caller gets [`AuthError::PartialRegistration`] naming it.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Profile, AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::Validation("name is required".into()));
        }
        password::check_policy(password, &self.config)?;

        let identity_id = self
            .provider
            .sign_up(email, password)
            .await
            .map_err(AuthError::from_sign_up)?;

        let input = CreateProfile {
            identity_id,
            name: name.to_string(),
            email: email.trim().to_lowercase(),
            role: self.config.default_role,
        };
        match self.store.insert(input).await {
            Ok(profile) => {
                info!(identity_id = %identity_id, role = %profile.role, "Staff registered");
                Ok(profile)
            }
            Err(e) => {
                error!(
                    identity_id = %identity_id,
                    error = %e,
                    "Identity created but profile insert failed; account needs repair"
                );
                Err(AuthError::PartialRegistration {
                    identity_id,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Stop processing and wait for the subscription to be released.
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                warn!(error = %e, "Synchronizer task ended abnormally");
            }
        }
    }
}

impl<I, P> Drop for SessionSynchronizer<I, P> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// The processing task's half of the synchronizer.
struct Worker<I, P> {
    provider: Arc<I>,
    store: Arc<P>,
    state: watch::Sender<AuthState>,
    sign_out_on_store_error: bool,
}

impl<I, P> Worker<I, P>
where
    I: IdentityProvider,
    P: ProfileStore,
{
    async fn run(self, mut subscription: Subscription, shutdown: CancellationToken) {
        let mut pending: Option<SessionEvent> = None;
        let mut open = true;

        loop {
            let event = match pending.take() {
                Some(event) => event,
                None if !open => break,
                None => tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break,
                    next = subscription.recv() => match next {
                        Some(event) => event,
                        None => break,
                    },
                },
            };
            debug!(event = event.kind(), "Session change");

            let Some(session) = event.session().cloned() else {
                self.publish(None);
                continue;
            };

            let lookup = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                next = subscription.recv(), if open => {
                    match next {
                        Some(newer) => {
                            debug!(superseded = event.kind(), "Newer session change; restarting resolution");
                            pending = Some(newer);
                        }
                        None => {
                            open = false;
                            pending = Some(event);
                        }
                    }
                    continue;
                }
                result = self.store.get_by_identity_id(session.identity_id) => {
                    ProfileLookup::from(result)
                }
            };

            self.settle(&session, lookup).await;
        }

        drop(subscription);
        info!("Session synchronizer released");
    }

    /// Apply the outcome of a profile lookup for `session`.
    async fn settle(&self, session: &Session, lookup: ProfileLookup) {
        match lookup {
            ProfileLookup::Found(profile) => {
                let user = ResolvedUser::resolve(session, profile);
                debug!(identity_id = %user.identity_id, role = %user.role, "Session resolved");
                self.publish(Some(user));
            }
            ProfileLookup::Absent => {
                warn!(
                    identity_id = %session.identity_id,
                    "Orphaned identity: session has no staff profile; forcing sign-out"
                );
                self.force_sign_out(session).await;
                self.publish(None);
            }
            ProfileLookup::Error(e) => {
                warn!(
                    identity_id = %session.identity_id,
                    error = %e,
                    "Profile lookup failed; treating session as anonymous"
                );
                if self.sign_out_on_store_error {
                    self.force_sign_out(session).await;
                }
                self.publish(None);
            }
        }
    }

    async fn force_sign_out(&self, session: &Session) {
        if let Err(e) = self.provider.sign_out().await {
            warn!(identity_id = %session.identity_id, error = %e, "Forced sign-out failed");
        }
    }

    fn publish(&self, user: Option<ResolvedUser>) {
        self.state.send_replace(AuthState {
            user,
            loading: false,
        });
    }
}
