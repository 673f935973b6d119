//! Contact entity: the email/mobile identity of an owner

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::owner::OwnerRef;
use crate::domain::value_objects::{Channel, LoginIdentifier};

/// Contact details of a person or company
///
/// `email` and `mobile` are normalized and globally unique when set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub owner: OwnerRef,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub telephone: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Contact {
    /// Creates a contact holding the identifier used at sign-up
    pub fn new(owner: OwnerRef, identifier: &LoginIdentifier, now: DateTime<Utc>) -> Self {
        let mut contact = Self {
            id: Uuid::new_v4(),
            owner,
            email: None,
            mobile: None,
            telephone: None,
            address: None,
            postal_code: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        contact.set_value(identifier.channel(), Some(identifier.value().to_string()), now);
        contact
    }

    pub fn value(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::Email => self.email.as_deref(),
            Channel::Mobile => self.mobile.as_deref(),
        }
    }

    pub fn set_value(&mut self, channel: Channel, value: Option<String>, now: DateTime<Utc>) {
        match channel {
            Channel::Email => self.email = value,
            Channel::Mobile => self.mobile = value,
        }
        self.updated_at = now;
    }

    /// Value rendered for callers: empty string when unset
    pub fn display_value(&self, channel: Channel) -> String {
        self.value(channel).unwrap_or_default().to_string()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
