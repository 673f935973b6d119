//! Authentication and authorization configuration

use serde::{Deserialize, Serialize};

const DEFAULT_SECRET: &str = "your-secret-key-change-in-production";

/// JWT authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// JWT secret key for signing tokens
    pub secret: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    #[serde(default = "default_audience")]
    pub audience: String,

    /// Algorithm for JWT signing (default: HS256)
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_SECRET),
            access_token_expiry: 7200,    // 2 hours
            refresh_token_expiry: 86400,  // 1 day
            issuer: String::from("customer-identity"),
            audience: default_audience(),
            algorithm: default_algorithm(),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in hours
    pub fn with_refresh_expiry_hours(mut self, hours: i64) -> Self {
        self.refresh_token_expiry = hours * 3600;
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_SECRET
    }
}

/// Failed sign-in lockout settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LockoutConfig {
    /// Failures within the window that lock the (identifier, source) pair
    pub failure_threshold: u32,

    /// Lifetime of the failure counter, counted from the first failure
    pub lockout_seconds: u64,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 4,
            lockout_seconds: 600,
        }
    }
}

/// reCAPTCHA verification for sign-in
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecaptchaConfig {
    pub enabled: bool,

    #[serde(default)]
    pub secret: String,

    #[serde(default = "default_recaptcha_url")]
    pub url: String,

    #[serde(default = "default_recaptcha_timeout")]
    pub timeout_seconds: u64,
}

impl Default for RecaptchaConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            secret: String::new(),
            url: default_recaptcha_url(),
            timeout_seconds: default_recaptcha_timeout(),
        }
    }
}

/// Password policy and hashing cost
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PasswordPolicyConfig {
    pub min_length: usize,

    /// bcrypt work factor
    pub bcrypt_cost: u32,
}

impl Default for PasswordPolicyConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            bcrypt_cost: 12,
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    pub jwt: JwtConfig,

    #[serde(default)]
    pub lockout: LockoutConfig,

    #[serde(default)]
    pub recaptcha: RecaptchaConfig,

    #[serde(default)]
    pub password: PasswordPolicyConfig,
}

impl AuthConfig {
    /// Overlay well-known environment variables on top of `base`
    pub fn from_env_with(base: Self) -> Self {
        let mut config = base;
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            config.jwt.secret = secret;
        }
        config.jwt.access_token_expiry =
            env_or("JWT_ACCESS_TOKEN_EXPIRY", config.jwt.access_token_expiry);
        config.jwt.refresh_token_expiry =
            env_or("JWT_REFRESH_TOKEN_EXPIRY", config.jwt.refresh_token_expiry);
        config.lockout.failure_threshold =
            env_or("LOGIN_FAILURE_THRESHOLD", config.lockout.failure_threshold);
        config.lockout.lockout_seconds =
            env_or("LOGIN_LOCKOUT_SECONDS", config.lockout.lockout_seconds);
        config.recaptcha.enabled = env_or("RECAPTCHA_ENABLED", config.recaptcha.enabled);
        if let Ok(secret) = std::env::var("RECAPTCHA_SECRET") {
            config.recaptcha.secret = secret;
        }
        if let Ok(url) = std::env::var("RECAPTCHA_URL") {
            config.recaptcha.url = url;
        }
        config
    }
}

pub(crate) fn env_or<T: std::str::FromStr>(key: &str, fallback: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(fallback)
}

fn default_audience() -> String {
    String::from("customer-identity-api")
}

fn default_algorithm() -> String {
    String::from("HS256")
}

fn default_recaptcha_url() -> String {
    String::from("https://www.google.com/recaptcha/api/siteverify")
}

fn default_recaptcha_timeout() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_builders() {
        let config = JwtConfig::new("secret")
            .with_access_expiry_minutes(30)
            .with_refresh_expiry_hours(48);
        assert_eq!(config.access_token_expiry, 1800);
        assert_eq!(config.refresh_token_expiry, 172800);
        assert!(!config.is_using_default_secret());
        assert!(JwtConfig::default().is_using_default_secret());
    }

    #[test]
    fn test_recaptcha_disabled_by_default() {
        let config = RecaptchaConfig::default();
        assert!(!config.enabled);
        assert!(config.url.ends_with("/siteverify"));
    }
}
