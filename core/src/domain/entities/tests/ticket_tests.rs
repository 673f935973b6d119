use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::VerificationTicket;
use crate::domain::value_objects::Channel;

#[test]
fn test_expiry_is_strictly_after_ttl() {
    let created = Utc::now();
    let ticket = VerificationTicket::email(Uuid::new_v4(), "a@example.com", created);

    assert!(!ticket.is_expired(created + Duration::seconds(100), 100));
    assert!(ticket.is_expired(created + Duration::seconds(101), 100));
}

#[test]
fn test_cooldown_remaining_rounds_up() {
    let created = Utc::now();
    let ticket = VerificationTicket::otp(Uuid::new_v4(), "+989121234567", 1234, created);

    assert_eq!(ticket.channel, Channel::Mobile);
    assert_eq!(ticket.cooldown_remaining(created + Duration::seconds(40), 100), Some(60));
    assert_eq!(
        ticket.cooldown_remaining(created + Duration::milliseconds(40_500), 100),
        Some(60)
    );
    assert_eq!(ticket.cooldown_remaining(created + Duration::seconds(100), 100), None);
}

#[test]
fn test_recency_breaks_ties_by_sequence() {
    let now = Utc::now();
    let mut first = VerificationTicket::email(Uuid::new_v4(), "a@example.com", now);
    let mut second = first.clone();
    first.sequence = 1;
    second.sequence = 2;
    assert!(second.recency() > first.recency());
}
