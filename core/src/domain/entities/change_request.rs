//! Append-only log of contact value changes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::Channel;

/// One `old -> new` transition of a customer's email or mobile
///
/// The latest record per (customer, channel) is the pending change while
/// `new_value` is non-empty; confirming the change clears `new_value`.
/// Registration writes an empty placeholder for both channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRequest {
    pub id: Uuid,

    /// Store-assigned insertion order, breaks `created_at` ties
    pub sequence: u64,

    pub customer_id: Uuid,
    pub channel: Channel,
    pub old_value: String,
    pub new_value: String,
    pub created_at: DateTime<Utc>,
}

impl ChangeRequest {
    pub fn new(
        customer_id: Uuid,
        channel: Channel,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence: 0,
            customer_id,
            channel,
            old_value: old_value.into(),
            new_value: new_value.into(),
            created_at: now,
        }
    }

    /// Empty record written at registration
    pub fn placeholder(customer_id: Uuid, channel: Channel, now: DateTime<Utc>) -> Self {
        Self::new(customer_id, channel, "", "", now)
    }

    pub fn is_pending(&self) -> bool {
        !self.new_value.is_empty()
    }

    pub fn pending_value(&self) -> Option<&str> {
        self.is_pending().then_some(self.new_value.as_str())
    }

    /// Marks the change as applied
    pub fn complete(&mut self) {
        self.new_value.clear();
    }

    /// Ordering key for "latest": creation time, then sequence
    pub fn recency(&self) -> (DateTime<Utc>, u64) {
        (self.created_at, self.sequence)
    }
}
