//! SurrealDB-backed implementation of [`IdentityProvider`].
//!
//! Accounts live in `identity` (email + Argon2id hash). A successful
//! sign-in persists the SHA-256 hash of an opaque token in
//! `auth_session`; presenting the raw token later resumes the session.
//! One provider instance models one client: it holds at most one live
//! session, and every change to it is broadcast to subscribers.

use chrono::{DateTime, Duration, Utc};
use clinic_core::error::{ClinicError, ClinicResult};
use clinic_core::identity::{IdentityProvider, SessionBroadcaster, Subscription};
use clinic_core::models::session::{Session, SessionEvent};
use parking_lot::Mutex;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::DbError;
use crate::password::{hash_password, verify_password};
use crate::token::{generate_session_token, hash_session_token};

/// Longest accepted session lifetime (ten years).
pub const MAX_SESSION_LIFETIME_SECS: u64 = 315_360_000;

/// Settings for the local identity provider.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Lifetime of a persisted session (default: 30 days).
    pub session_lifetime_secs: u64,
    /// Optional server-side secret prepended to passwords.
    pub pepper: Option<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            session_lifetime_secs: 2_592_000,
            pepper: None,
        }
    }
}

#[derive(Debug, SurrealValue)]
struct IdentityRowWithId {
    record_id: String,
    email: String,
    password_hash: String,
}

#[derive(Debug, SurrealValue)]
struct SessionRow {
    identity_id: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct EmailRow {
    email: String,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Expiry of a session issued at `now`, or `Validation` when the
/// configured lifetime cannot be represented.
fn session_expiry(now: DateTime<Utc>, lifetime_secs: u64) -> ClinicResult<DateTime<Utc>> {
    i64::try_from(lifetime_secs)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| ClinicError::Validation {
            message: format!("session lifetime of {lifetime_secs}s is out of range"),
        })
}

fn parse_uuid(s: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Decode(format!("invalid identity UUID: {e}")))
}

pub struct SurrealIdentityProvider<C: Connection> {
    db: Surreal<C>,
    config: IdentityConfig,
    current: Mutex<Option<Session>>,
    broadcaster: SessionBroadcaster,
}

impl<C: Connection> SurrealIdentityProvider<C> {
    pub fn new(db: Surreal<C>, config: IdentityConfig) -> Self {
        Self {
            db,
            config,
            current: Mutex::new(None),
            broadcaster: SessionBroadcaster::new(),
        }
    }

    /// The live session held by this client, if any.
    pub fn current_session(&self) -> Option<Session> {
        self.current.lock().clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.broadcaster.subscriber_count()
    }

    /// Resume a session persisted by an earlier sign-in.
    ///
    /// Returns `Ok(None)` for unknown or expired tokens; expired rows are
    /// removed.
    pub async fn restore_session(&self, raw_token: &str) -> ClinicResult<Option<Session>> {
        let token_hash = hash_session_token(raw_token);

        let mut result = self
            .db
            .query(
                "SELECT identity_id, expires_at, created_at FROM auth_session \
                 WHERE token_hash = $token_hash",
            )
            .bind(("token_hash", token_hash.clone()))
            .await
            .map_err(DbError::from)?;
        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        let Some(row) = rows.into_iter().next() else {
            debug!("No persisted session for presented token");
            return Ok(None);
        };

        if row.expires_at <= Utc::now() {
            self.delete_session_row(&token_hash).await?;
            debug!(identity_id = %row.identity_id, "Persisted session expired");
            return Ok(None);
        }

        let identity_id = parse_uuid(&row.identity_id)?;
        let mut result = self
            .db
            .query("SELECT email FROM type::record('identity', $id)")
            .bind(("id", row.identity_id.clone()))
            .await
            .map_err(DbError::from)?;
        let emails: Vec<EmailRow> = result.take(0).map_err(DbError::from)?;
        let Some(email) = emails.into_iter().next().map(|r| r.email) else {
            // The account behind the session is gone.
            self.delete_session_row(&token_hash).await?;
            return Ok(None);
        };

        let session = Session {
            identity_id,
            raw: serde_json::json!({
                "identity_id": identity_id,
                "email": email,
                "created_at": row.created_at,
                "expires_at": row.expires_at,
            }),
            email,
            access_token: raw_token.to_string(),
            expires_at: row.expires_at,
        };

        *self.current.lock() = Some(session.clone());
        self.broadcaster
            .emit(SessionEvent::SignedIn(session.clone()));
        info!(identity_id = %identity_id, "Session restored");

        Ok(Some(session))
    }

    async fn delete_session_row(&self, token_hash: &str) -> Result<(), DbError> {
        self.db
            .query("DELETE auth_session WHERE token_hash = $token_hash")
            .bind(("token_hash", token_hash.to_string()))
            .await?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;
        Ok(())
    }

    async fn find_identity(&self, email: &str) -> Result<Option<IdentityRowWithId>, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, email, password_hash \
                 FROM identity WHERE email = $email",
            )
            .bind(("email", email.to_string()))
            .await?;
        let rows: Vec<IdentityRowWithId> = result.take(0)?;
        Ok(rows.into_iter().next())
    }
}

impl<C: Connection> IdentityProvider for SurrealIdentityProvider<C> {
    fn subscribe(&self) -> Subscription {
        self.broadcaster.subscribe(self.current_session())
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> ClinicResult<Session> {
        let email = normalize_email(email);
        let identity = self
            .find_identity(&email)
            .await?
            .ok_or(ClinicError::InvalidCredentials)?;

        let valid = verify_password(
            password,
            &identity.password_hash,
            self.config.pepper.as_deref(),
        )
        .map_err(|e| ClinicError::Crypto(e.to_string()))?;
        if !valid {
            return Err(ClinicError::InvalidCredentials);
        }

        let identity_id = parse_uuid(&identity.record_id)?;
        let expires_at = session_expiry(Utc::now(), self.config.session_lifetime_secs)?;
        let raw_token = generate_session_token();

        self.db
            .query(
                "CREATE auth_session SET identity_id = $identity_id, \
                 token_hash = $token_hash, expires_at = $expires_at",
            )
            .bind(("identity_id", identity.record_id.clone()))
            .bind(("token_hash", hash_session_token(&raw_token)))
            .bind(("expires_at", expires_at))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let session = Session {
            identity_id,
            raw: serde_json::json!({
                "identity_id": identity_id,
                "email": identity.email,
                "expires_at": expires_at,
            }),
            email: identity.email,
            access_token: raw_token,
            expires_at,
        };

        // A sign-in replaces whatever session this client held.
        let previous = self.current.lock().replace(session.clone());
        if let Some(previous) = previous {
            if let Err(e) = self
                .delete_session_row(&hash_session_token(&previous.access_token))
                .await
            {
                // The replaced session is no longer held here; its row expires on its own.
                warn!(identity_id = %previous.identity_id, error = %e, "Could not delete replaced session row");
            }
        }
        self.broadcaster
            .emit(SessionEvent::SignedIn(session.clone()));

        Ok(session)
    }

    async fn sign_out(&self) -> ClinicResult<()> {
        let previous = self.current.lock().take();
        if let Some(session) = previous {
            if let Err(e) = self
                .delete_session_row(&hash_session_token(&session.access_token))
                .await
            {
                // The local session is already gone; the row expires on its own.
                warn!(identity_id = %session.identity_id, error = %e, "Could not delete session row");
            }
            debug!(identity_id = %session.identity_id, "Signed out");
        }
        self.broadcaster.emit(SessionEvent::SignedOut);
        Ok(())
    }

    async fn sign_up(&self, email: &str, password: &str) -> ClinicResult<Uuid> {
        let email = normalize_email(email);
        if email.is_empty() || !email.contains('@') {
            return Err(ClinicError::Validation {
                message: format!("invalid email address: {email}"),
            });
        }
        if self.find_identity(&email).await?.is_some() {
            return Err(ClinicError::AlreadyExists {
                entity: "identity".into(),
            });
        }

        let id = Uuid::new_v4();
        let password_hash = hash_password(password, self.config.pepper.as_deref())?;

        self.db
            .query(
                "CREATE type::record('identity', $id) SET \
                 email = $email, password_hash = $password_hash",
            )
            .bind(("id", id.to_string()))
            .bind(("email", email))
            .bind(("password_hash", password_hash))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(identity_id = %id, "Identity created");
        Ok(id)
    }
}
