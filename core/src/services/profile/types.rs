//! Types for the profile service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{ChangeRequest, Contact, Owner};
use crate::domain::value_objects::Channel;
use crate::services::verification::IssuedTicket;

/// Contact as presented to callers, unset values rendered empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub id: Uuid,
    pub email: String,
    pub mobile: String,
    pub telephone: String,
    pub address: String,
    pub postal_code: String,
}

impl From<&Contact> for ContactDetails {
    fn from(contact: &Contact) -> Self {
        Self {
            id: contact.id,
            email: contact.display_value(Channel::Email),
            mobile: contact.display_value(Channel::Mobile),
            telephone: contact.telephone.clone().unwrap_or_default(),
            address: contact.address.clone().unwrap_or_default(),
            postal_code: contact.postal_code.clone().unwrap_or_default(),
        }
    }
}

/// Full customer view
#[derive(Debug, Clone, Serialize)]
pub struct CustomerProfile {
    pub id: Uuid,
    pub is_active: bool,
    pub email_verify: Option<DateTime<Utc>>,
    pub mobile_verify: Option<DateTime<Utc>>,
    pub total_credit: i64,
    pub contact: ContactDetails,
    pub owner: Option<Owner>,
    /// Latest email change request
    pub email_change: Option<ChangeRequest>,
    /// Latest mobile change request
    pub mobile_change: Option<ChangeRequest>,
}

/// Partial profile update; `None` leaves a field as it is
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub name: Option<String>,
    pub last_name: Option<String>,
    pub national_code: Option<String>,
}

/// Updated profile plus any verification cycles the update started
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdateOutcome {
    pub profile: CustomerProfile,
    pub started: Vec<IssuedTicket>,
}
