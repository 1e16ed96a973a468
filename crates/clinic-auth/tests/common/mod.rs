//! Fake collaborators with failure injection for synchronizer tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use clinic_auth::{AuthConfig, AuthState, Navigator, Route, SessionSynchronizer};
use clinic_core::error::{ClinicError, ClinicResult};
use clinic_core::identity::{IdentityProvider, SessionBroadcaster, Subscription};
use clinic_core::models::profile::{CreateProfile, Profile, Role};
use clinic_core::models::session::{Session, SessionEvent};
use clinic_core::repository::{PaginatedResult, Pagination, ProfileStore};
use tokio::sync::watch;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity provider
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeIdentityProvider {
    broadcaster: SessionBroadcaster,
    accounts: Mutex<HashMap<String, (Uuid, String)>>,
    current: Mutex<Option<Session>>,
    sign_out_calls: AtomicUsize,
    sign_up_calls: AtomicUsize,
}

pub fn session_for(identity_id: Uuid, email: &str) -> Session {
    Session {
        identity_id,
        email: email.to_string(),
        access_token: format!("token-{identity_id}"),
        expires_at: Utc::now() + chrono::Duration::hours(1),
        raw: serde_json::json!({ "provider": "fake" }),
    }
}

impl FakeIdentityProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_account(&self, email: &str, password: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.accounts
            .lock()
            .insert(email.to_string(), (id, password.to_string()));
        id
    }

    /// Pretend a session survived from a previous visit.
    pub fn set_current(&self, session: Session) {
        *self.current.lock() = Some(session);
    }

    /// Push an arbitrary event to every subscriber.
    pub fn emit(&self, event: SessionEvent) {
        self.broadcaster.emit(event);
    }

    /// Provider-side refresh of the live session.
    pub fn refresh(&self) {
        let current = self.current.lock().clone();
        if let Some(session) = current {
            self.broadcaster.emit(SessionEvent::Refreshed(session));
        }
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }

    pub fn sign_up_calls(&self) -> usize {
        self.sign_up_calls.load(Ordering::SeqCst)
    }

    pub fn subscriber_count(&self) -> usize {
        self.broadcaster.subscriber_count()
    }

    pub fn current(&self) -> Option<Session> {
        self.current.lock().clone()
    }
}

impl IdentityProvider for FakeIdentityProvider {
    fn subscribe(&self) -> Subscription {
        self.broadcaster.subscribe(self.current())
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> ClinicResult<Session> {
        let account = self.accounts.lock().get(email).cloned();
        match account {
            Some((id, stored)) if stored == password => {
                let session = session_for(id, email);
                *self.current.lock() = Some(session.clone());
                self.broadcaster
                    .emit(SessionEvent::SignedIn(session.clone()));
                Ok(session)
            }
            _ => Err(ClinicError::InvalidCredentials),
        }
    }

    async fn sign_out(&self) -> ClinicResult<()> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        *self.current.lock() = None;
        self.broadcaster.emit(SessionEvent::SignedOut);
        Ok(())
    }

    async fn sign_up(&self, email: &str, password: &str) -> ClinicResult<Uuid> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);
        if self.accounts.lock().contains_key(email) {
            return Err(ClinicError::AlreadyExists {
                entity: "identity".into(),
            });
        }
        Ok(self.add_account(email, password))
    }
}

// ---------------------------------------------------------------------------
// Profile store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeProfileStore {
    profiles: Mutex<HashMap<Uuid, Profile>>,
    fail_lookups: AtomicBool,
    fail_inserts: AtomicBool,
    /// Lookups for this identity never complete.
    stalled: Mutex<Option<Uuid>>,
    lookups: AtomicUsize,
}

impl FakeProfileStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn put(&self, identity_id: Uuid, name: &str, email: &str, role: Role) {
        let now = Utc::now();
        self.profiles.lock().insert(
            identity_id,
            Profile {
                identity_id,
                name: name.to_string(),
                email: email.to_string(),
                role,
                created_at: now,
                updated_at: now,
            },
        );
    }

    pub fn fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn stall_lookups_for(&self, identity_id: Uuid) {
        *self.stalled.lock() = Some(identity_id);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn contains(&self, identity_id: Uuid) -> bool {
        self.profiles.lock().contains_key(&identity_id)
    }
}

impl ProfileStore for FakeProfileStore {
    async fn get_by_identity_id(&self, identity_id: Uuid) -> ClinicResult<Option<Profile>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let stalled = *self.stalled.lock() == Some(identity_id);
        if stalled {
            std::future::pending::<()>().await;
        }
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(ClinicError::Database("profile store unreachable".into()));
        }
        Ok(self.profiles.lock().get(&identity_id).cloned())
    }

    async fn insert(&self, input: CreateProfile) -> ClinicResult<Profile> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(ClinicError::Database("insert rejected".into()));
        }
        self.put(input.identity_id, &input.name, &input.email, input.role);
        Ok(self.profiles.lock()[&input.identity_id].clone())
    }

    async fn update_role(&self, identity_id: Uuid, role: Role) -> ClinicResult<Profile> {
        let mut profiles = self.profiles.lock();
        let profile = profiles
            .get_mut(&identity_id)
            .ok_or_else(|| ClinicError::NotFound {
                entity: "staff_profile".into(),
                id: identity_id.to_string(),
            })?;
        profile.role = role;
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn list(&self, pagination: Pagination) -> ClinicResult<PaginatedResult<Profile>> {
        let mut items: Vec<Profile> = self.profiles.lock().values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = items.len() as u64;
        let items = items
            .into_iter()
            .skip(pagination.offset as usize)
            .take(pagination.limit as usize)
            .collect();
        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn count(&self) -> ClinicResult<u64> {
        Ok(self.profiles.lock().len() as u64)
    }
}

// ---------------------------------------------------------------------------
// Navigator and helpers
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().push(route);
    }
}

pub type FakeSynchronizer = SessionSynchronizer<FakeIdentityProvider, FakeProfileStore>;

pub struct Harness {
    pub provider: Arc<FakeIdentityProvider>,
    pub store: Arc<FakeProfileStore>,
    pub navigator: Arc<RecordingNavigator>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            provider: FakeIdentityProvider::new(),
            store: FakeProfileStore::new(),
            navigator: RecordingNavigator::new(),
        }
    }

    pub fn start(&self) -> FakeSynchronizer {
        self.start_with(AuthConfig::default())
    }

    pub fn start_with(&self, config: AuthConfig) -> FakeSynchronizer {
        SessionSynchronizer::start(
            Arc::clone(&self.provider),
            Arc::clone(&self.store),
            self.navigator.clone(),
            config,
        )
    }
}

const WAIT: Duration = Duration::from_secs(5);

/// Wait until the published state satisfies `predicate`.
pub async fn wait_for_state(
    rx: &mut watch::Receiver<AuthState>,
    predicate: impl FnMut(&AuthState) -> bool,
) -> AuthState {
    tokio::time::timeout(WAIT, rx.wait_for(predicate))
        .await
        .expect("timed out waiting for state")
        .expect("synchronizer dropped its sender")
        .clone()
}

/// Poll `condition` until it holds.
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(WAIT, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition never became true");
}

/// Give the processing task a chance to act on anything queued.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
