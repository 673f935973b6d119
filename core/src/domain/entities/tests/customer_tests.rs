use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::{ChangeRequest, Contact, Customer, OwnerRef};
use crate::domain::value_objects::{Channel, LoginIdentifier};

fn customer() -> Customer {
    Customer::new(Uuid::new_v4(), OwnerRef::person(Uuid::new_v4()), "hash".into(), Utc::now())
}

#[test]
fn test_new_customer_is_inactive_and_unverified() {
    let customer = customer();
    assert!(!customer.is_active);
    assert!(!customer.is_verified(Channel::Email));
    assert!(!customer.is_verified(Channel::Mobile));
    assert_eq!(customer.total_credit, 0);
}

#[test]
fn test_either_channel_activates() {
    let mut customer = customer();
    customer.mark_verified(Channel::Mobile, Utc::now());
    assert!(customer.is_active);
    assert!(customer.is_verified(Channel::Mobile));
    assert!(!customer.is_verified(Channel::Email));
}

#[test]
fn test_reset_touches_only_its_channel() {
    let mut customer = customer();
    let now = Utc::now();
    customer.mark_verified(Channel::Email, now);
    customer.mark_verified(Channel::Mobile, now);

    customer.reset_verification(Channel::Mobile, now + Duration::seconds(5));

    assert!(!customer.is_active);
    assert_eq!(customer.mobile_verify, None);
    assert_eq!(customer.email_verify, Some(now));
}

#[test]
fn test_contact_holds_signup_identifier() {
    let id = LoginIdentifier::mobile("09121234567").unwrap();
    let contact = Contact::new(OwnerRef::person(Uuid::new_v4()), &id, Utc::now());
    assert_eq!(contact.mobile.as_deref(), Some("+989121234567"));
    assert_eq!(contact.email, None);
    assert_eq!(contact.display_value(Channel::Email), "");
}

#[test]
fn test_change_request_pending_until_completed() {
    let now = Utc::now();
    let placeholder = ChangeRequest::placeholder(Uuid::new_v4(), Channel::Email, now);
    assert!(!placeholder.is_pending());

    let mut change = ChangeRequest::new(Uuid::new_v4(), Channel::Email, "old@x.io", "new@x.io", now);
    assert_eq!(change.pending_value(), Some("new@x.io"));
    change.complete();
    assert!(!change.is_pending());
    assert_eq!(change.old_value, "old@x.io");
}
