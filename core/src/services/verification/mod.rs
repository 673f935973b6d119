//! Email-link and mobile-OTP verification workflow
//!
//! This module provides:
//! - Verification cycles per customer and channel (start, resend, confirm)
//! - Direct contact changes while unverified, bounded by a change limit
//! - Re-verification after a profile change of email or mobile
//! - Collaborator traits for message delivery and OTP generation

mod config;
mod service;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use config::VerificationServiceConfig;
pub use service::VerificationWorkflow;
pub use traits::{
    CodeGenerator, FixedCodeGenerator, NotificationSink, RandomCodeGenerator,
    RecordingNotificationSink,
};
pub use types::{EmailMessage, IssuedTicket, SmsMessage, EMAIL_VERIFICATION_TEMPLATE};
