//! Configuration for the authentication service

use ident_shared::config::AuthConfig;

/// Configuration for the authentication service
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// Require a reCAPTCHA response on sign-in
    pub recaptcha_enabled: bool,
    /// Failed attempts that lock an (identifier, source) pair
    pub failure_threshold: u32,
    /// Lockout window in seconds, counted from the first failure
    pub lockout_seconds: u64,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self {
            recaptcha_enabled: false,
            failure_threshold: 4,
            lockout_seconds: 600,
        }
    }
}

impl From<&AuthConfig> for AuthServiceConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            recaptcha_enabled: config.recaptcha.enabled,
            failure_threshold: config.lockout.failure_threshold,
            lockout_seconds: config.lockout.lockout_seconds,
        }
    }
}
