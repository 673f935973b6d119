use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ident_shared::utils::clock::{Clock, ManualClock};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Barrier;
use uuid::Uuid;

use super::mocks::SequenceCodeGenerator;
use crate::domain::entities::{
    ChangeRequest, Contact, Customer, Owner, OwnerRef, Person, VerificationTicket,
};
use crate::domain::value_objects::{Channel, LoginIdentifier, NationalCode};
use crate::errors::DomainError;
use crate::repositories::{
    IdentityStore, InMemoryIdentityStore, MemoryCache, PendingChange, RegistrationBundle,
    VerificationCommit,
};
use crate::services::session::{SessionConfig, SessionIssuer};
use crate::services::verification::{
    RecordingNotificationSink, VerificationServiceConfig, VerificationWorkflow,
};
use crate::test_support::seed_customer_at;

/// Holds the first `held` customer loads until that many callers arrive,
/// so concurrent confirms all start from the same snapshot
struct InterleavingStore {
    inner: InMemoryIdentityStore,
    held: AtomicUsize,
    barrier: Barrier,
}

impl InterleavingStore {
    fn new() -> Self {
        Self {
            inner: InMemoryIdentityStore::new(),
            held: AtomicUsize::new(0),
            barrier: Barrier::new(2),
        }
    }

    fn hold_next_loads(&self) {
        self.held.store(2, Ordering::SeqCst);
    }
}

#[async_trait]
impl IdentityStore for InterleavingStore {
    async fn find_contact_by_email(&self, email: &str) -> Result<Option<Contact>, DomainError> {
        self.inner.find_contact_by_email(email).await
    }

    async fn find_contact_by_mobile(&self, mobile: &str) -> Result<Option<Contact>, DomainError> {
        self.inner.find_contact_by_mobile(mobile).await
    }

    async fn find_person_by_national_code(
        &self,
        code: &NationalCode,
    ) -> Result<Option<Person>, DomainError> {
        self.inner.find_person_by_national_code(code).await
    }

    async fn find_contact(&self, id: Uuid) -> Result<Option<Contact>, DomainError> {
        self.inner.find_contact(id).await
    }

    async fn find_customer(&self, id: Uuid) -> Result<Option<Customer>, DomainError> {
        let customer = self.inner.find_customer(id).await?;
        let held = self
            .held
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if held {
            self.barrier.wait().await;
        }
        Ok(customer)
    }

    async fn find_customer_by_contact(
        &self,
        contact_id: Uuid,
    ) -> Result<Option<Customer>, DomainError> {
        self.inner.find_customer_by_contact(contact_id).await
    }

    async fn find_owner(&self, owner: OwnerRef) -> Result<Option<Owner>, DomainError> {
        self.inner.find_owner(owner).await
    }

    async fn create_registration(
        &self,
        bundle: RegistrationBundle,
    ) -> Result<RegistrationBundle, DomainError> {
        self.inner.create_registration(bundle).await
    }

    async fn update_contact(&self, contact: &Contact) -> Result<(), DomainError> {
        self.inner.update_contact(contact).await
    }

    async fn update_customer(&self, customer: &Customer) -> Result<(), DomainError> {
        self.inner.update_customer(customer).await
    }

    async fn update_person(&self, person: &Person) -> Result<(), DomainError> {
        self.inner.update_person(person).await
    }

    async fn soft_delete_customer(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        self.inner.soft_delete_customer(id, at).await
    }

    async fn latest_change_request(
        &self,
        customer_id: Uuid,
        channel: Channel,
    ) -> Result<Option<ChangeRequest>, DomainError> {
        self.inner.latest_change_request(customer_id, channel).await
    }

    async fn update_change_request(&self, change: &ChangeRequest) -> Result<(), DomainError> {
        self.inner.update_change_request(change).await
    }

    async fn record_pending_change(
        &self,
        pending: PendingChange,
    ) -> Result<ChangeRequest, DomainError> {
        self.inner.record_pending_change(pending).await
    }

    async fn create_ticket(
        &self,
        ticket: VerificationTicket,
    ) -> Result<VerificationTicket, DomainError> {
        self.inner.create_ticket(ticket).await
    }

    async fn list_tickets(
        &self,
        customer_id: Uuid,
        channel: Channel,
    ) -> Result<Vec<VerificationTicket>, DomainError> {
        self.inner.list_tickets(customer_id, channel).await
    }

    async fn commit_verification(
        &self,
        commit: VerificationCommit,
    ) -> Result<Customer, DomainError> {
        self.inner.commit_verification(commit).await
    }
}

#[tokio::test]
async fn test_concurrent_confirms_keep_both_channels() {
    let clock = ManualClock::starting_now();
    let store = Arc::new(InterleavingStore::new());
    let cache = Arc::new(MemoryCache::with_clock(Arc::new(clock.clone())));
    let sessions = Arc::new(SessionIssuer::new(
        cache,
        SessionConfig::default(),
        Arc::new(clock.clone()),
    ));
    let workflow = VerificationWorkflow::new(
        store.clone(),
        sessions,
        Arc::new(RecordingNotificationSink::new()),
        Arc::new(SequenceCodeGenerator::new(&[1234])),
        Arc::new(clock.clone()),
        VerificationServiceConfig::default(),
    );

    let identifier = LoginIdentifier::mobile("09121234567").unwrap();
    let customer = seed_customer_at(&store.inner, &identifier, "secret123", false, clock.now()).await;
    let mut contact = store.find_contact(customer.contact_id).await.unwrap().unwrap();
    contact.email = Some("both@example.com".to_string());
    store.update_contact(&contact).await.unwrap();

    let link = workflow.start_email_cycle(customer.id).await.unwrap();
    workflow.start_mobile_cycle(customer.id).await.unwrap();

    store.hold_next_loads();
    let (email, mobile) = tokio::join!(
        workflow.confirm_email(customer.id, link.ticket_id),
        workflow.confirm_mobile(customer.id, "1234"),
    );
    email.unwrap();
    mobile.unwrap();

    let stored = store.find_customer(customer.id).await.unwrap().unwrap();
    assert!(stored.email_verify.is_some());
    assert!(stored.mobile_verify.is_some());
    assert!(stored.is_active);
}
