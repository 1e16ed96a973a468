//! Identity session domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Proof of authentication issued by the identity provider.
///
/// Opaque to the clinic core beyond the identity id and email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub identity_id: Uuid,
    pub email: String,
    /// Opaque bearer token handed out by the provider.
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    /// Raw provider payload, kept for diagnostics.
    pub raw: serde_json::Value,
}

/// Session-change notification pushed by the identity provider.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Delivered once, immediately after subscribing.
    Initial(Option<Session>),
    SignedIn(Session),
    /// Provider-side token or account refresh for the live session.
    Refreshed(Session),
    SignedOut,
}

impl SessionEvent {
    /// The live session carried by this event, if any.
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionEvent::Initial(session) => session.as_ref(),
            SessionEvent::SignedIn(session) | SessionEvent::Refreshed(session) => Some(session),
            SessionEvent::SignedOut => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::Initial(_) => "initial",
            SessionEvent::SignedIn(_) => "signed_in",
            SessionEvent::Refreshed(_) => "refreshed",
            SessionEvent::SignedOut => "signed_out",
        }
    }
}
