//! Customer entity: the authenticatable account bound to a contact

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::owner::OwnerRef;
use crate::domain::value_objects::Channel;

/// Customer account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Unique identifier for the customer
    pub id: Uuid,

    /// Contact used to sign in
    pub contact_id: Uuid,

    pub owner: OwnerRef,

    /// bcrypt hash of the password
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Set by the first successful verification on either channel
    pub is_active: bool,

    /// When the current email was verified, `None` while unverified
    pub email_verify: Option<DateTime<Utc>>,

    /// When the current mobile was verified, `None` while unverified
    pub mobile_verify: Option<DateTime<Utc>>,

    /// Account credit in minor currency units
    pub total_credit: i64,

    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Customer {
    /// Creates an inactive, unverified customer
    pub fn new(contact_id: Uuid, owner: OwnerRef, password_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            contact_id,
            owner,
            password_hash,
            is_active: false,
            email_verify: None,
            mobile_verify: None,
            total_credit: 0,
            last_login: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn verified_at(&self, channel: Channel) -> Option<DateTime<Utc>> {
        match channel {
            Channel::Email => self.email_verify,
            Channel::Mobile => self.mobile_verify,
        }
    }

    pub fn is_verified(&self, channel: Channel) -> bool {
        self.verified_at(channel).is_some()
    }

    /// Records a successful verification and activates the account
    pub fn mark_verified(&mut self, channel: Channel, now: DateTime<Utc>) {
        match channel {
            Channel::Email => self.email_verify = Some(now),
            Channel::Mobile => self.mobile_verify = Some(now),
        }
        self.is_active = true;
        self.updated_at = now;
    }

    /// Clears one channel's verification and deactivates the account
    ///
    /// The other channel's timestamp is left untouched.
    pub fn reset_verification(&mut self, channel: Channel, now: DateTime<Utc>) {
        match channel {
            Channel::Email => self.email_verify = None,
            Channel::Mobile => self.mobile_verify = None,
        }
        self.is_active = false;
        self.updated_at = now;
    }

    pub fn set_password_hash(&mut self, hash: String, now: DateTime<Utc>) {
        self.password_hash = hash;
        self.updated_at = now;
    }

    pub fn record_login(&mut self, now: DateTime<Utc>) {
        self.last_login = Some(now);
        self.updated_at = now;
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
