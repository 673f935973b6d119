//! Message and result types for the verification workflow

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::value_objects::Channel;

/// Template name for the verification link email
pub const EMAIL_VERIFICATION_TEMPLATE: &str = "customer/email_verification";

/// Templated email handed to the delivery queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub template: String,
    pub context: HashMap<String, String>,
    pub recipients: Vec<String>,
}

/// One-time code handed to the delivery queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsMessage {
    pub customer_id: Uuid,
    pub recipient: String,
    pub code: String,
}

/// A ticket that was created and dispatched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedTicket {
    pub ticket_id: Uuid,
    pub channel: Channel,
    /// When the ticket stops being confirmable
    pub expires_at: DateTime<Utc>,
    /// Earliest time a resend is accepted
    pub resend_available_at: DateTime<Utc>,
}
