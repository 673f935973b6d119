//! Shared utilities and common types for the identity service
//!
//! This crate provides functionality used by every other crate in the workspace:
//! - Configuration types and loading
//! - Error response structure and error codes
//! - Contact normalization helpers (email, mobile)
//! - Injectable clock

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CacheConfig, ConfigError, DatabaseConfig, Environment, JwtConfig,
    LockoutConfig, LoggingConfig, PasswordPolicyConfig, RecaptchaConfig, VerificationConfig,
};
pub use errors::{error_codes, ErrorResponse, IntoErrorResponse};
pub use utils::{clock, email, mobile};
pub use utils::clock::{Clock, ManualClock, SystemClock};
