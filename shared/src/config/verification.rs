//! Contact verification lifecycle settings

use serde::{Deserialize, Serialize};

use super::auth::env_or;

/// Email ticket and mobile OTP settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// Age after which an email ticket can no longer be confirmed
    pub email_ticket_ttl_seconds: u64,

    /// Minimum age of the newest email ticket before a resend is allowed
    pub email_resend_cooldown_seconds: u64,

    /// Maximum distinct email targets across outstanding tickets
    pub email_change_limit: usize,

    /// Age after which an OTP can no longer be confirmed
    pub otp_ttl_seconds: u64,

    /// Minimum age of the newest OTP before a resend is allowed
    pub otp_resend_cooldown_seconds: u64,

    /// Maximum distinct mobile targets across outstanding OTPs
    pub otp_change_limit: usize,

    /// Link sent in verification emails; `{customer_id}` and `{ticket_id}` are substituted
    pub email_verification_url_template: String,

    /// Always issue this code instead of a random one (development only)
    #[serde(default)]
    pub fixed_otp_code: Option<u16>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            email_ticket_ttl_seconds: 100,
            email_resend_cooldown_seconds: 100,
            email_change_limit: 3,
            otp_ttl_seconds: 100,
            otp_resend_cooldown_seconds: 100,
            otp_change_limit: 3,
            email_verification_url_template: String::from(
                "http://localhost:8000/customer/{customer_id}/verify-email/{ticket_id}",
            ),
            fixed_otp_code: None,
        }
    }
}

impl VerificationConfig {
    /// Overlay well-known environment variables on top of `base`
    pub fn from_env_with(base: Self) -> Self {
        let mut config = base;
        config.email_ticket_ttl_seconds =
            env_or("EMAIL_VERIFICATION_EXPIRE_TIME", config.email_ticket_ttl_seconds);
        config.email_resend_cooldown_seconds = env_or(
            "EMAIL_VERIFICATION_RESEND_TIME_LIMIT",
            config.email_resend_cooldown_seconds,
        );
        config.email_change_limit =
            env_or("EMAIL_VERIFICATION_CHANGE_LIMIT", config.email_change_limit);
        config.otp_ttl_seconds = env_or("OTP_EXPIRE_TIME", config.otp_ttl_seconds);
        config.otp_resend_cooldown_seconds =
            env_or("OTP_RESEND_TIME_LIMIT", config.otp_resend_cooldown_seconds);
        if let Ok(template) = std::env::var("EMAIL_VERIFICATION_URL") {
            config.email_verification_url_template = template;
        }
        config
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.email_ticket_ttl_seconds == 0 || self.otp_ttl_seconds == 0 {
            return Err("verification ticket TTLs must be positive".into());
        }
        if self.email_change_limit == 0 || self.otp_change_limit == 0 {
            return Err("verification change limits must be positive".into());
        }
        if !self.email_verification_url_template.contains("{ticket_id}") {
            return Err("email_verification_url_template must contain {ticket_id}".into());
        }
        if matches!(self.fixed_otp_code, Some(code) if !(1000..=9999).contains(&code)) {
            return Err("fixed_otp_code must be a 4-digit number".into());
        }
        Ok(())
    }
}
