use chrono::Utc;
use ident_shared::utils::clock::ManualClock;
use std::sync::Arc;

use crate::domain::value_objects::Channel;
use crate::errors::{DomainError, ValidationError};
use crate::repositories::{IdentityStore, InMemoryIdentityStore, MemoryCache};
use crate::services::credentials::PasswordPolicy;
use crate::services::registration::{RegistrationRequest, RegistrationService};
use crate::services::session::{SessionConfig, SessionIssuer};
use crate::services::verification::{
    FixedCodeGenerator, RecordingNotificationSink, VerificationServiceConfig,
    VerificationWorkflow,
};
use crate::test_support::test_hasher;

type TestRegistration =
    RegistrationService<InMemoryIdentityStore, MemoryCache, RecordingNotificationSink>;

struct Harness {
    store: Arc<InMemoryIdentityStore>,
    sink: Arc<RecordingNotificationSink>,
    service: Arc<TestRegistration>,
}

fn harness() -> Harness {
    let clock = ManualClock::starting_now();
    let store = Arc::new(InMemoryIdentityStore::new());
    let cache = Arc::new(MemoryCache::with_clock(Arc::new(clock.clone())));
    let sessions = Arc::new(SessionIssuer::new(
        cache,
        SessionConfig::default(),
        Arc::new(clock.clone()),
    ));
    let sink = Arc::new(RecordingNotificationSink::new());
    let workflow = Arc::new(VerificationWorkflow::new(
        store.clone(),
        sessions,
        sink.clone(),
        Arc::new(FixedCodeGenerator(1234)),
        Arc::new(clock.clone()),
        VerificationServiceConfig::default(),
    ));
    let service = Arc::new(RegistrationService::new(
        store.clone(),
        workflow,
        test_hasher(),
        PasswordPolicy::default(),
        Arc::new(clock),
    ));
    Harness {
        store,
        sink,
        service,
    }
}

fn by_email(email: &str, national_code: &str) -> RegistrationRequest {
    RegistrationRequest {
        email: Some(email.to_string()),
        national_code: national_code.to_string(),
        password: "secret123".to_string(),
        agree_with_policy: true,
        ..RegistrationRequest::default()
    }
}

fn by_mobile(mobile: &str, national_code: &str) -> RegistrationRequest {
    RegistrationRequest {
        mobile: Some(mobile.to_string()),
        national_code: national_code.to_string(),
        password: "secret123".to_string(),
        agree_with_policy: true,
        ..RegistrationRequest::default()
    }
}

#[tokio::test]
async fn test_register_by_email() {
    let h = harness();
    let registration = h
        .service
        .register(by_email("user@example.com", "0012345679"))
        .await
        .unwrap();

    let customer = &registration.customer;
    assert!(!customer.is_active);
    assert!(customer.email_verify.is_none());
    assert_eq!(registration.contact.email.as_deref(), Some("user@example.com"));
    assert!(registration.contact.mobile.is_none());
    assert_eq!(
        registration.person.national_code.as_ref().map(|c| c.as_str()),
        Some("0012345679")
    );
    assert!(test_hasher().verify("secret123", &customer.password_hash));

    // empty placeholders for both channels
    for channel in [Channel::Email, Channel::Mobile] {
        let change = h
            .store
            .latest_change_request(customer.id, channel)
            .await
            .unwrap()
            .unwrap();
        assert!(!change.is_pending());
        assert!(change.old_value.is_empty());
    }

    let ticket = registration.ticket.unwrap();
    assert_eq!(ticket.channel, Channel::Email);
    assert_eq!(h.sink.emails().len(), 1);
    assert!(h.sink.sms().is_empty());
}

#[tokio::test]
async fn test_register_by_mobile_sends_code() {
    let h = harness();
    let registration = h
        .service
        .register(by_mobile("00989121234567", "0012345679"))
        .await
        .unwrap();

    assert_eq!(registration.contact.mobile.as_deref(), Some("+989121234567"));
    assert_eq!(registration.ticket.unwrap().channel, Channel::Mobile);
    assert_eq!(h.sink.last_sms().unwrap().code, "1234");
    assert!(h.sink.emails().is_empty());
}

#[tokio::test]
async fn test_exactly_one_identifier() {
    let h = harness();

    let mut both = by_email("user@example.com", "0012345679");
    both.mobile = Some("09121234567".to_string());
    let neither = RegistrationRequest {
        national_code: "0012345679".to_string(),
        password: "secret123".to_string(),
        agree_with_policy: true,
        ..RegistrationRequest::default()
    };

    for request in [both, neither] {
        assert_eq!(
            h.service.register(request).await.unwrap_err(),
            DomainError::ValidationErr(ValidationError::ConflictingIdentifier)
        );
    }
    assert_eq!(h.store.customer_count().await, 0);
}

#[tokio::test]
async fn test_field_validation() {
    let h = harness();

    let err = h
        .service
        .register(by_email("user@example.com", "0012345678"))
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::ValidationErr(ValidationError::InvalidNationalCode));

    let mut weak = by_email("user@example.com", "0012345679");
    weak.password = "password".to_string();
    assert!(matches!(
        h.service.register(weak).await.unwrap_err(),
        DomainError::ValidationErr(ValidationError::WeakPassword { .. })
    ));

    let mut disagree = by_email("user@example.com", "0012345679");
    disagree.agree_with_policy = false;
    assert_eq!(
        h.service.register(disagree).await.unwrap_err(),
        DomainError::ValidationErr(ValidationError::PolicyNotAccepted)
    );

    assert_eq!(
        h.service
            .register(by_mobile("0912123", "0012345679"))
            .await
            .unwrap_err(),
        DomainError::ValidationErr(ValidationError::InvalidMobile)
    );
    assert_eq!(h.store.customer_count().await, 0);
    assert!(h.sink.emails().is_empty());
}

#[tokio::test]
async fn test_duplicates() {
    let h = harness();
    h.service
        .register(by_email("user@example.com", "0012345679"))
        .await
        .unwrap();
    h.service
        .register(by_mobile("09121234567", "0000000019"))
        .await
        .unwrap();

    let cases = [
        (by_email("user@example.com", "1111111111"), "email"),
        (by_mobile("+989121234567", "1111111111"), "mobile"),
        (by_email("other@example.com", "0012345679"), "national_code"),
    ];
    for (request, field) in cases {
        assert_eq!(
            h.service.register(request).await.unwrap_err(),
            DomainError::duplicate(field)
        );
    }
    assert_eq!(h.store.customer_count().await, 2);
}

#[tokio::test]
async fn test_soft_deleted_identifiers_stay_reserved() {
    let h = harness();
    let registration = h
        .service
        .register(by_email("user@example.com", "0012345679"))
        .await
        .unwrap();
    h.store
        .soft_delete_customer(registration.customer.id, Utc::now())
        .await
        .unwrap();

    let err = h
        .service
        .register(by_email("user@example.com", "1111111111"))
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::duplicate("email"));
}

#[tokio::test]
async fn test_concurrent_sign_ups_with_same_email() {
    let h = harness();

    let a = {
        let service = h.service.clone();
        tokio::spawn(async move {
            service
                .register(by_email("race@example.com", "0012345679"))
                .await
        })
    };
    let b = {
        let service = h.service.clone();
        tokio::spawn(async move {
            service
                .register(by_email("race@example.com", "1111111111"))
                .await
        })
    };
    let results = [a.await.unwrap(), b.await.unwrap()];

    let failures: Vec<_> = results.iter().filter_map(|r| r.as_ref().err()).collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0], &DomainError::duplicate("email"));
    assert_eq!(h.store.customer_count().await, 1);
}
