//! Password policy applied before an account is created.

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Reject passwords shorter than the configured minimum (in chars).
pub fn check_policy(password: &str, config: &AuthConfig) -> Result<(), AuthError> {
    if password.chars().count() < config.min_password_length {
        return Err(AuthError::WeakPassword {
            min_length: config.min_password_length,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_password_is_rejected() {
        let err = check_policy("abc12", &AuthConfig::default()).unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword { min_length: 6 }));
    }

    #[test]
    fn minimum_length_is_inclusive() {
        assert!(check_policy("aze123", &AuthConfig::default()).is_ok());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let config = AuthConfig {
            min_password_length: 4,
            ..Default::default()
        };
        assert!(check_policy("éèà", &config).is_err());
        assert!(check_policy("éèàç", &config).is_ok());
    }
}
