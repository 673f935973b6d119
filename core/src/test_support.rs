//! Fixtures shared by unit tests across services

use chrono::{DateTime, Utc};

use crate::domain::entities::{ChangeRequest, Contact, Customer, OwnerRef, Person};
use crate::domain::value_objects::{Channel, LoginIdentifier};
use crate::repositories::{IdentityStore, RegistrationBundle};
use crate::services::credentials::PasswordHasher;

/// Cheapest bcrypt cost, tests only
pub const TEST_BCRYPT_COST: u32 = 4;

pub fn test_hasher() -> PasswordHasher {
    PasswordHasher::new(TEST_BCRYPT_COST)
}

/// Store a customer with the given login identifier and password
pub async fn seed_customer<S: IdentityStore>(
    store: &S,
    identifier: &LoginIdentifier,
    password: &str,
    active: bool,
) -> Customer {
    seed_customer_at(store, identifier, password, active, Utc::now()).await
}

/// Same as [`seed_customer`], with every record stamped `now`
///
/// Pass the workflow's clock time so the sign-up placeholders never look newer
/// than changes the workflow records afterwards.
pub async fn seed_customer_at<S: IdentityStore>(
    store: &S,
    identifier: &LoginIdentifier,
    password: &str,
    active: bool,
    now: DateTime<Utc>,
) -> Customer {
    let person = Person::new(None, now);
    let owner = OwnerRef::person(person.id);
    let contact = Contact::new(owner, identifier, now);
    let hash = test_hasher().hash(password).unwrap();
    let mut customer = Customer::new(contact.id, owner, hash, now);
    if active {
        customer.mark_verified(identifier.channel(), now);
    }
    let bundle = RegistrationBundle {
        email_change: ChangeRequest::placeholder(customer.id, Channel::Email, now),
        mobile_change: ChangeRequest::placeholder(customer.id, Channel::Mobile, now),
        person,
        contact,
        customer,
    };
    store.create_registration(bundle).await.unwrap().customer
}
