use super::mocks::WorkflowHarness;
use crate::domain::value_objects::Channel;
use crate::errors::{DomainError, ValidationError, VerificationError};
use crate::repositories::IdentityStore;

#[tokio::test]
async fn test_request_email_change_updates_contact_immediately() {
    let h = WorkflowHarness::new();
    let customer = h.email_customer("old@example.com").await;
    h.workflow.start_email_cycle(customer.id).await.unwrap();

    let issued = h
        .workflow
        .request_email_change(customer.id, "New@Example.COM")
        .await
        .unwrap();

    let contact = h.store.find_contact(customer.contact_id).await.unwrap().unwrap();
    assert_eq!(contact.email.as_deref(), Some("New@example.com"));
    assert!(h.customer(&customer).await.email_verify.is_none());
    assert_eq!(
        h.sink.last_email().unwrap().recipients,
        vec!["New@example.com".to_string()]
    );

    h.workflow
        .confirm_email(customer.id, issued.ticket_id)
        .await
        .unwrap();
    assert!(h.customer(&customer).await.is_active);
}

#[tokio::test]
async fn test_change_limit_counts_distinct_targets() {
    let h = WorkflowHarness::new();
    let customer = h.email_customer("a@example.com").await;
    h.workflow.start_email_cycle(customer.id).await.unwrap();

    h.workflow
        .request_email_change(customer.id, "b@example.com")
        .await
        .unwrap();
    h.workflow
        .request_email_change(customer.id, "c@example.com")
        .await
        .unwrap();

    // repeating known targets never counts as new
    for _ in 0..3 {
        h.workflow
            .request_email_change(customer.id, "b@example.com")
            .await
            .unwrap();
    }
    h.workflow
        .request_email_change(customer.id, "a@example.com")
        .await
        .unwrap();

    let err = h
        .workflow
        .request_email_change(customer.id, "d@example.com")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DomainError::Verification(VerificationError::ChangeLimitExceeded {
            channel: Channel::Email,
            limit: 3,
        })
    );
    let contact = h.store.find_contact(customer.contact_id).await.unwrap().unwrap();
    assert_eq!(contact.email.as_deref(), Some("a@example.com"));
}

#[tokio::test]
async fn test_change_to_taken_email_is_a_conflict() {
    let h = WorkflowHarness::new();
    h.email_customer("taken@example.com").await;
    let customer = h.email_customer("mine@example.com").await;

    let err = h
        .workflow
        .request_email_change(customer.id, "taken@example.com")
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::duplicate("email"));
}

#[tokio::test]
async fn test_change_rejected_once_verified() {
    let h = WorkflowHarness::new();
    let customer = h.verified_customer("user@example.com", "09121234567").await;

    let err = h
        .workflow
        .request_email_change(customer.id, "new@example.com")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Verification(VerificationError::AlreadyVerified { .. })
    ));

    let err = h
        .workflow
        .request_mobile_change(customer.id, "09351112233")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DomainError::Verification(VerificationError::AlreadyVerified {
            channel: Channel::Mobile
        })
    );
}

#[tokio::test]
async fn test_change_validates_format() {
    let h = WorkflowHarness::new();
    let customer = h.mobile_customer("09121234567").await;

    let err = h
        .workflow
        .request_mobile_change(customer.id, "12345")
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::ValidationErr(ValidationError::InvalidMobile));

    let err = h
        .workflow
        .request_email_change(customer.id, "not-an-email")
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::ValidationErr(ValidationError::InvalidEmail));
}

#[tokio::test]
async fn test_mobile_change_resets_only_mobile() {
    let h = WorkflowHarness::new();
    let customer = h.verified_customer("user@example.com", "09121234567").await;
    let email_verified_at = h.customer(&customer).await.email_verify;

    h.workflow
        .record_mobile_change(customer.id, "09351112233")
        .await
        .unwrap();

    let stored = h.customer(&customer).await;
    assert!(stored.mobile_verify.is_none());
    assert!(!stored.is_active);
    assert_eq!(stored.email_verify, email_verified_at);

    // the contact keeps the old number until confirmation
    let contact = h.store.find_contact(customer.contact_id).await.unwrap().unwrap();
    assert_eq!(contact.mobile.as_deref(), Some("+989121234567"));
    assert_eq!(h.sink.last_sms().unwrap().recipient, "+989351112233");

    let change = h
        .store
        .latest_change_request(customer.id, Channel::Mobile)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(change.old_value, "+989121234567");
    assert_eq!(change.pending_value(), Some("+989351112233"));

    h.workflow.confirm_mobile(customer.id, "1234").await.unwrap();

    let stored = h.customer(&customer).await;
    assert!(stored.is_active);
    assert!(stored.mobile_verify.is_some());
    let contact = h.store.find_contact(customer.contact_id).await.unwrap().unwrap();
    assert_eq!(contact.mobile.as_deref(), Some("+989351112233"));
    let change = h
        .store
        .latest_change_request(customer.id, Channel::Mobile)
        .await
        .unwrap()
        .unwrap();
    assert!(!change.is_pending());
}

#[tokio::test]
async fn test_pending_email_change_gets_the_link() {
    let h = WorkflowHarness::new();
    let customer = h.verified_customer("user@example.com", "09121234567").await;

    let issued = h
        .workflow
        .record_email_change(customer.id, "next@example.com")
        .await
        .unwrap();
    assert_eq!(
        h.sink.last_email().unwrap().recipients,
        vec!["next@example.com".to_string()]
    );

    // a resend still targets the pending address
    h.clock.advance_secs(100);
    h.workflow.resend_email(customer.id).await.unwrap();
    assert_eq!(
        h.sink.last_email().unwrap().recipients,
        vec!["next@example.com".to_string()]
    );

    h.workflow
        .confirm_email(customer.id, issued.ticket_id)
        .await
        .unwrap();
    let contact = h.store.find_contact(customer.contact_id).await.unwrap().unwrap();
    assert_eq!(contact.email.as_deref(), Some("next@example.com"));
    assert!(h.customer(&customer).await.mobile_verify.is_some());
}

#[tokio::test]
async fn test_direct_change_supersedes_pending_change() {
    let h = WorkflowHarness::new();
    let customer = h.verified_customer("user@example.com", "09121234567").await;
    h.workflow
        .record_email_change(customer.id, "pending@example.com")
        .await
        .unwrap();

    let issued = h
        .workflow
        .request_email_change(customer.id, "direct@example.com")
        .await
        .unwrap();
    assert_eq!(
        h.sink.last_email().unwrap().recipients,
        vec!["direct@example.com".to_string()]
    );

    h.workflow
        .confirm_email(customer.id, issued.ticket_id)
        .await
        .unwrap();
    let contact = h.store.find_contact(customer.contact_id).await.unwrap().unwrap();
    assert_eq!(contact.email.as_deref(), Some("direct@example.com"));
}

#[tokio::test]
async fn test_link_for_previous_address_cannot_confirm_new_one() {
    let h = WorkflowHarness::new();
    let customer = h.email_customer("owner@example.com").await;
    let old_link = h.workflow.start_email_cycle(customer.id).await.unwrap();

    h.workflow
        .request_email_change(customer.id, "victim@example.com")
        .await
        .unwrap();

    let err = h
        .workflow
        .confirm_email(customer.id, old_link.ticket_id)
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::Verification(VerificationError::TicketNotFound));

    let stored = h.customer(&customer).await;
    assert!(stored.email_verify.is_none());
    assert!(!stored.is_active);
}

#[tokio::test]
async fn test_link_for_current_address_cannot_confirm_pending_change() {
    let h = WorkflowHarness::new();
    let customer = h.email_customer("owner@example.com").await;
    let old_link = h.workflow.start_email_cycle(customer.id).await.unwrap();

    h.workflow
        .record_email_change(customer.id, "next@example.com")
        .await
        .unwrap();

    let err = h
        .workflow
        .confirm_email(customer.id, old_link.ticket_id)
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::Verification(VerificationError::TicketNotFound));

    let contact = h.store.find_contact(customer.contact_id).await.unwrap().unwrap();
    assert_eq!(contact.email.as_deref(), Some("owner@example.com"));
    assert!(h.customer(&customer).await.email_verify.is_none());
}
