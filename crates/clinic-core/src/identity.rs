//! Identity provider contract and session-change subscriptions.
//!
//! The provider owns the session lifecycle. Consumers observe it through
//! a [`Subscription`]: an in-order event stream whose release hook runs
//! exactly once, when the subscription is dropped.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::ClinicResult;
use crate::models::session::{Session, SessionEvent};

pub trait IdentityProvider: Send + Sync {
    /// Register for session-change notifications. The first event is
    /// always [`SessionEvent::Initial`] with the current session.
    fn subscribe(&self) -> Subscription;

    /// Fails with [`ClinicError::InvalidCredentials`] when the provider
    /// rejects the attempt.
    ///
    /// [`ClinicError::InvalidCredentials`]: crate::error::ClinicError::InvalidCredentials
    fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = ClinicResult<Session>> + Send;

    fn sign_out(&self) -> impl Future<Output = ClinicResult<()>> + Send;

    /// Create an account and return its identity id. Does not sign in.
    fn sign_up(&self, email: &str, password: &str)
    -> impl Future<Output = ClinicResult<Uuid>> + Send;
}

type ReleaseHook = Box<dyn FnOnce() + Send>;

/// Handle to a live session-change subscription.
pub struct Subscription {
    events: mpsc::UnboundedReceiver<SessionEvent>,
    release: Option<ReleaseHook>,
}

impl Subscription {
    pub fn new(
        events: mpsc::UnboundedReceiver<SessionEvent>,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            events,
            release: Some(Box::new(release)),
        }
    }

    /// Next event in delivery order. `None` once the provider has gone
    /// away.
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    /// Release the subscription now instead of at drop.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// Fan-out registry of session-change listeners, for provider
/// implementations.
#[derive(Clone, Default)]
pub struct SessionBroadcaster {
    listeners: Arc<Mutex<HashMap<u64, mpsc::UnboundedSender<SessionEvent>>>>,
    next_id: Arc<AtomicU64>,
}

impl SessionBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener and queue the `Initial` event for it.
    pub fn subscribe(&self, current: Option<Session>) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        // Cannot fail: the receiver is still held here.
        let _ = tx.send(SessionEvent::Initial(current));

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().insert(id, tx);

        let listeners = Arc::clone(&self.listeners);
        Subscription::new(rx, move || {
            listeners.lock().remove(&id);
        })
    }

    /// Deliver an event to every live listener, pruning closed ones.
    pub fn emit(&self, event: SessionEvent) {
        self.listeners
            .lock()
            .retain(|_, tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn session(email: &str) -> Session {
        Session {
            identity_id: Uuid::new_v4(),
            email: email.into(),
            access_token: "token".into(),
            expires_at: Utc::now(),
            raw: serde_json::Value::Null,
        }
    }

    #[tokio::test]
    async fn initial_event_is_delivered_first() {
        let broadcaster = SessionBroadcaster::new();
        let s = session("a@x.com");
        let mut sub = broadcaster.subscribe(Some(s.clone()));
        broadcaster.emit(SessionEvent::SignedOut);

        assert_eq!(sub.recv().await, Some(SessionEvent::Initial(Some(s))));
        assert_eq!(sub.recv().await, Some(SessionEvent::SignedOut));
    }

    #[test]
    fn dropping_subscription_releases_listener() {
        let broadcaster = SessionBroadcaster::new();
        let first = broadcaster.subscribe(None);
        let second = broadcaster.subscribe(None);
        assert_eq!(broadcaster.subscriber_count(), 2);

        drop(first);
        assert_eq!(broadcaster.subscriber_count(), 1);

        second.unsubscribe();
        assert_eq!(broadcaster.subscriber_count(), 0);
    }

    #[test]
    fn release_hook_runs_once() {
        let calls = Arc::new(AtomicU64::new(0));
        let (_tx, rx) = mpsc::unbounded_channel();
        let counter = Arc::clone(&calls);
        let sub = Subscription::new(rx, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        sub.unsubscribe();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
