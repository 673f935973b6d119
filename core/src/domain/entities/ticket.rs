//! Ephemeral verification tickets

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::Channel;

/// Proof of one verification attempt
///
/// Email tickets are confirmed by their `id`, which travels in the link.
/// Mobile tickets carry a 4-digit `code` that is sent by SMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationTicket {
    pub id: Uuid,

    /// Store-assigned insertion order, breaks `created_at` ties
    pub sequence: u64,

    pub customer_id: Uuid,
    pub channel: Channel,

    /// Address or number the ticket was issued for
    pub target: String,

    #[serde(skip_serializing)]
    pub code: Option<u16>,

    pub created_at: DateTime<Utc>,
}

impl VerificationTicket {
    pub fn email(customer_id: Uuid, target: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence: 0,
            customer_id,
            channel: Channel::Email,
            target: target.into(),
            code: None,
            created_at: now,
        }
    }

    pub fn otp(customer_id: Uuid, target: impl Into<String>, code: u16, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence: 0,
            customer_id,
            channel: Channel::Mobile,
            target: target.into(),
            code: Some(code),
            created_at: now,
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.created_at
    }

    /// True once the ticket is older than `ttl_seconds`
    pub fn is_expired(&self, now: DateTime<Utc>, ttl_seconds: u64) -> bool {
        self.age(now) > Duration::seconds(ttl_seconds as i64)
    }

    /// Seconds left until `cooldown_seconds` have passed since creation, if any
    pub fn cooldown_remaining(&self, now: DateTime<Utc>, cooldown_seconds: u64) -> Option<u64> {
        let remaining = Duration::seconds(cooldown_seconds as i64) - self.age(now);
        if remaining > Duration::zero() {
            // round partial seconds up so the caller never retries too early
            let millis = remaining.num_milliseconds();
            Some(((millis + 999) / 1000) as u64)
        } else {
            None
        }
    }

    /// Ordering key for "latest": creation time, then sequence
    pub fn recency(&self) -> (DateTime<Utc>, u64) {
        (self.created_at, self.sequence)
    }
}
