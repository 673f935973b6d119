//! Request types for the authentication service

use serde::{Deserialize, Serialize};

/// Sign-in by email or mobile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub password: String,
    /// reCAPTCHA response token, required when the gate is enabled
    pub recaptcha: Option<String>,
    /// Client address the attempt came from
    pub source: String,
}

/// Password change for an authenticated customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
    /// Refresh token to revoke once the password is changed
    pub refresh: String,
}
