//! Outbound delivery transports used by the job queue worker

use async_trait::async_trait;
use tracing::info;

use ident_core::services::{EmailMessage, SmsMessage};
use ident_shared::utils::{mask_email, mask_mobile};

/// Sends a rendered verification email
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn deliver_email(&self, message: &EmailMessage) -> anyhow::Result<()>;
}

/// Sends a one-time code by SMS
#[async_trait]
pub trait SmsTransport: Send + Sync {
    async fn deliver_sms(&self, message: &SmsMessage) -> anyhow::Result<()>;
}

/// Writes emails to the log instead of sending them
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEmailTransport;

#[async_trait]
impl EmailTransport for LoggingEmailTransport {
    async fn deliver_email(&self, message: &EmailMessage) -> anyhow::Result<()> {
        let recipients: Vec<String> = message.recipients.iter().map(|r| mask_email(r)).collect();
        info!(
            event = "email_delivered",
            template = %message.template,
            recipients = ?recipients,
            "Email handed to log transport"
        );
        Ok(())
    }
}

/// Writes SMS to the log instead of sending them; the code itself is never logged
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSmsTransport;

#[async_trait]
impl SmsTransport for LoggingSmsTransport {
    async fn deliver_sms(&self, message: &SmsMessage) -> anyhow::Result<()> {
        info!(
            event = "sms_delivered",
            customer_id = %message.customer_id,
            recipient = %mask_mobile(&message.recipient),
            "SMS handed to log transport"
        );
        Ok(())
    }
}
