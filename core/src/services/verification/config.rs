//! Configuration for the verification workflow

use ident_shared::config::VerificationConfig;

use crate::domain::value_objects::Channel;

/// Configuration for the verification workflow
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// Seconds an email ticket stays confirmable
    pub email_ticket_ttl_seconds: u64,
    /// Minimum seconds between email resends
    pub email_resend_cooldown_seconds: u64,
    /// Distinct email targets allowed before verification
    pub email_change_limit: usize,
    /// Seconds an OTP stays confirmable
    pub otp_ttl_seconds: u64,
    /// Minimum seconds between OTP resends
    pub otp_resend_cooldown_seconds: u64,
    /// Distinct mobile targets allowed before verification
    pub otp_change_limit: usize,
    /// Link template with `{customer_id}` and `{ticket_id}` placeholders
    pub verification_url_template: String,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self::from(&VerificationConfig::default())
    }
}

impl From<&VerificationConfig> for VerificationServiceConfig {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            email_ticket_ttl_seconds: config.email_ticket_ttl_seconds,
            email_resend_cooldown_seconds: config.email_resend_cooldown_seconds,
            email_change_limit: config.email_change_limit,
            otp_ttl_seconds: config.otp_ttl_seconds,
            otp_resend_cooldown_seconds: config.otp_resend_cooldown_seconds,
            otp_change_limit: config.otp_change_limit,
            verification_url_template: config.email_verification_url_template.clone(),
        }
    }
}

impl VerificationServiceConfig {
    pub fn ticket_ttl(&self, channel: Channel) -> u64 {
        match channel {
            Channel::Email => self.email_ticket_ttl_seconds,
            Channel::Mobile => self.otp_ttl_seconds,
        }
    }

    pub fn resend_cooldown(&self, channel: Channel) -> u64 {
        match channel {
            Channel::Email => self.email_resend_cooldown_seconds,
            Channel::Mobile => self.otp_resend_cooldown_seconds,
        }
    }

    pub fn change_limit(&self, channel: Channel) -> usize {
        match channel {
            Channel::Email => self.email_change_limit,
            Channel::Mobile => self.otp_change_limit,
        }
    }

    pub fn verification_url(&self, customer_id: &str, ticket_id: &str) -> String {
        self.verification_url_template
            .replace("{customer_id}", customer_id)
            .replace("{ticket_id}", ticket_id)
    }
}
