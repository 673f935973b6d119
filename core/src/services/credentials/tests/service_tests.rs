use std::sync::Arc;
use uuid::Uuid;

use crate::domain::value_objects::LoginIdentifier;
use crate::errors::{AuthError, DomainError};
use crate::repositories::{IdentityStore, InMemoryIdentityStore};
use crate::services::credentials::CredentialVerifier;
use crate::test_support::{seed_customer, test_hasher};

fn verifier(store: Arc<InMemoryIdentityStore>) -> CredentialVerifier<InMemoryIdentityStore> {
    CredentialVerifier::new(store, test_hasher())
}

#[tokio::test]
async fn test_authenticate_by_email_and_mobile() {
    let store = Arc::new(InMemoryIdentityStore::new());
    let by_email = LoginIdentifier::email("Ali@Example.com").unwrap();
    let by_mobile = LoginIdentifier::mobile("09121234567").unwrap();
    let a = seed_customer(store.as_ref(), &by_email, "secret123", true).await;
    let b = seed_customer(store.as_ref(), &by_mobile, "secret456", true).await;
    let verifier = verifier(store);

    let found = verifier
        .authenticate(&LoginIdentifier::email("Ali@example.COM").unwrap(), "secret123")
        .await
        .unwrap();
    assert_eq!(found.id, a.id);

    let found = verifier
        .authenticate(&LoginIdentifier::mobile("+989121234567").unwrap(), "secret456")
        .await
        .unwrap();
    assert_eq!(found.id, b.id);
}

#[tokio::test]
async fn test_unknown_identifier_and_wrong_password_are_distinct_internally() {
    let store = Arc::new(InMemoryIdentityStore::new());
    let identifier = LoginIdentifier::email("user@example.com").unwrap();
    seed_customer(store.as_ref(), &identifier, "secret123", true).await;
    let verifier = verifier(store);

    let err = verifier
        .authenticate(&LoginIdentifier::email("nobody@example.com").unwrap(), "secret123")
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::Auth(AuthError::UnknownIdentifier));

    let err = verifier.authenticate(&identifier, "wrong1234").await.unwrap_err();
    assert_eq!(err, DomainError::Auth(AuthError::InvalidCredentials));
}

#[tokio::test]
async fn test_inactive_customer_still_authenticates() {
    let store = Arc::new(InMemoryIdentityStore::new());
    let identifier = LoginIdentifier::mobile("09351112233").unwrap();
    let customer = seed_customer(store.as_ref(), &identifier, "secret123", false).await;
    let verifier = verifier(store);

    let found = verifier.authenticate(&identifier, "secret123").await.unwrap();
    assert_eq!(found.id, customer.id);
    assert!(!found.is_active);

    // get_user is stricter
    assert!(verifier.get_user(customer.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_user() {
    let store = Arc::new(InMemoryIdentityStore::new());
    let identifier = LoginIdentifier::email("user@example.com").unwrap();
    let customer = seed_customer(store.as_ref(), &identifier, "secret123", true).await;
    let verifier = verifier(store.clone());

    let found = verifier.get_user(customer.id).await.unwrap().unwrap();
    assert_eq!(found.id, customer.id);
    assert!(verifier.get_user(Uuid::new_v4()).await.unwrap().is_none());

    store
        .soft_delete_customer(customer.id, chrono::Utc::now())
        .await
        .unwrap();
    assert!(verifier.get_user(customer.id).await.unwrap().is_none());
    let err = verifier.authenticate(&identifier, "secret123").await.unwrap_err();
    assert_eq!(err, DomainError::Auth(AuthError::UnknownIdentifier));
}
