//! Process configuration read from `CLINIC_*` environment variables.

use anyhow::{Context, bail};
use clinic_auth::AuthConfig;
use clinic_core::models::profile::Role;
use clinic_db::{DbConfig, IdentityConfig, MAX_SESSION_LIFETIME_SECS};

/// Administrator account created on first start.
#[derive(Debug, Clone)]
pub struct SeedAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    pub db: DbConfig,
    pub identity: IdentityConfig,
    pub auth: AuthConfig,
    pub seed_admin: Option<SeedAdmin>,
    /// Persisted session token to resume at startup.
    pub session_token: Option<String>,
}

impl ServerConfig {
    /// Load `.env` (existing variables win), then read the environment.
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset or empty variables
    /// keep their defaults; malformed values are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get("CLINIC_DB_URL") {
            config.db.url = url;
        }
        if let Some(ns) = get("CLINIC_DB_NS") {
            config.db.namespace = ns;
        }
        if let Some(name) = get("CLINIC_DB_NAME") {
            config.db.database = name;
        }
        if let Some(user) = get("CLINIC_DB_USER") {
            config.db.username = user;
        }
        if let Some(pass) = get("CLINIC_DB_PASS") {
            config.db.password = pass;
        }

        config.identity.pepper = get("CLINIC_PASSWORD_PEPPER");
        if let Some(secs) = get("CLINIC_SESSION_LIFETIME_SECS") {
            let lifetime: u64 = secs
                .trim()
                .parse()
                .with_context(|| format!("CLINIC_SESSION_LIFETIME_SECS: invalid value {secs:?}"))?;
            if lifetime > MAX_SESSION_LIFETIME_SECS {
                bail!(
                    "CLINIC_SESSION_LIFETIME_SECS: {lifetime} exceeds the maximum of \
                     {MAX_SESSION_LIFETIME_SECS}"
                );
            }
            config.identity.session_lifetime_secs = lifetime;
        }

        if let Some(len) = get("CLINIC_MIN_PASSWORD_LENGTH") {
            config.auth.min_password_length = len
                .trim()
                .parse()
                .with_context(|| format!("CLINIC_MIN_PASSWORD_LENGTH: invalid value {len:?}"))?;
        }
        if let Some(role) = get("CLINIC_DEFAULT_ROLE") {
            config.auth.default_role = role
                .parse::<Role>()
                .context("CLINIC_DEFAULT_ROLE")?;
        }
        if let Some(flag) = get("CLINIC_SIGN_OUT_ON_STORE_ERROR") {
            config.auth.sign_out_on_store_error = parse_flag("CLINIC_SIGN_OUT_ON_STORE_ERROR", &flag)?;
        }

        config.seed_admin = match (
            get("CLINIC_SEED_ADMIN_NAME"),
            get("CLINIC_SEED_ADMIN_EMAIL"),
            get("CLINIC_SEED_ADMIN_PASSWORD"),
        ) {
            (Some(name), Some(email), Some(password)) => Some(SeedAdmin {
                name,
                email,
                password,
            }),
            (None, None, None) => None,
            _ => bail!(
                "CLINIC_SEED_ADMIN_NAME, CLINIC_SEED_ADMIN_EMAIL and \
                 CLINIC_SEED_ADMIN_PASSWORD must be set together"
            ),
        };
        config.session_token = get("CLINIC_SESSION_TOKEN");

        Ok(config)
    }
}

fn parse_flag(key: &str, value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("{key}: expected a boolean, got {other:?}"),
    }
}
