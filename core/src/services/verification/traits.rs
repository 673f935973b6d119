//! Collaborator traits for message delivery and code generation

use async_trait::async_trait;
use rand::Rng;
use std::sync::Mutex;

use super::types::{EmailMessage, SmsMessage};

/// Fire-and-forget delivery of verification messages
///
/// Implementations enqueue and return; delivery failures are theirs to retry or
/// report. The workflow never waits on delivery.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send_email(&self, message: EmailMessage);

    async fn send_sms(&self, message: SmsMessage);
}

/// Source of 4-digit one-time codes
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> u16;
}

/// Uniform codes in 1000..=9999
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> u16 {
        rand::thread_rng().gen_range(1000..=9999)
    }
}

/// Always the same code, for development environments and tests
#[derive(Debug, Clone, Copy)]
pub struct FixedCodeGenerator(pub u16);

impl CodeGenerator for FixedCodeGenerator {
    fn generate(&self) -> u16 {
        self.0
    }
}

/// Sink that keeps every message in memory
#[derive(Debug, Default)]
pub struct RecordingNotificationSink {
    emails: Mutex<Vec<EmailMessage>>,
    sms: Mutex<Vec<SmsMessage>>,
}

impl RecordingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emails(&self) -> Vec<EmailMessage> {
        self.emails.lock().map(|m| m.clone()).unwrap_or_default()
    }

    pub fn sms(&self) -> Vec<SmsMessage> {
        self.sms.lock().map(|m| m.clone()).unwrap_or_default()
    }

    pub fn last_email(&self) -> Option<EmailMessage> {
        self.emails().pop()
    }

    pub fn last_sms(&self) -> Option<SmsMessage> {
        self.sms().pop()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotificationSink {
    async fn send_email(&self, message: EmailMessage) {
        if let Ok(mut emails) = self.emails.lock() {
            emails.push(message);
        }
    }

    async fn send_sms(&self, message: SmsMessage) {
        if let Ok(mut sms) = self.sms.lock() {
            sms.push(message);
        }
    }
}
