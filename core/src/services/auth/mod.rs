//! Sign-in, sign-out and password change
//!
//! This module provides:
//! - Brute-force lockout per (identifier, source)
//! - Optional reCAPTCHA gate in front of sign-in
//! - Token issuance on successful sign-in
//! - Password change with refresh token revocation

mod config;
mod rate_limiter;
mod service;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use config::AuthServiceConfig;
pub use rate_limiter::LoginRateLimiter;
pub use service::AuthService;
pub use traits::{CaptchaVerifier, StaticCaptchaVerifier};
pub use types::{ChangePasswordRequest, SignInRequest};
