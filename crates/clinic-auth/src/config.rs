//! Authentication configuration.

use clinic_core::models::profile::Role;

/// Configuration for session synchronization and registration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Role given to newly registered staff (default: Assistant).
    pub default_role: Role,
    /// Minimum password length accepted at registration (default: 6).
    pub min_password_length: usize,
    /// Also force a sign-out when the profile store cannot be reached
    /// during background resolution. Off by default: the session stays
    /// and the next session-change event retries.
    pub sign_out_on_store_error: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            default_role: Role::Assistant,
            min_password_length: 6,
            sign_out_on_store_error: false,
        }
    }
}
