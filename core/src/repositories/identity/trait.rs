//! Identity store trait defining the interface for contact, customer, owner,
//! change-request and ticket persistence.
//!
//! Every lookup ignores soft-deleted contacts and customers. Uniqueness of
//! email, mobile and national code still covers soft-deleted rows, so a deleted
//! account keeps its identifiers reserved.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::{
    ChangeRequest, Contact, Customer, Owner, OwnerRef, Person, VerificationTicket,
};
use crate::domain::value_objects::{Channel, NationalCode};
use crate::errors::DomainError;

/// Everything registration creates, written in one unit
#[derive(Debug, Clone)]
pub struct RegistrationBundle {
    pub person: Person,
    pub contact: Contact,
    pub customer: Customer,
    pub email_change: ChangeRequest,
    pub mobile_change: ChangeRequest,
}

/// Writes performed by a successful confirmation, applied in one unit
///
/// The store must remove `consumed_ticket` first and fail with
/// `VerificationError::TicketNotFound` if it is already gone, so two racing
/// confirmations of the same ticket cannot both succeed. Only the confirmed
/// channel's columns are written: the other channel's verification and contact
/// value are read and kept as stored, never taken from a caller's snapshot.
#[derive(Debug, Clone)]
pub struct VerificationCommit {
    pub customer_id: Uuid,
    pub channel: Channel,
    pub consumed_ticket: Uuid,
    pub verified_at: DateTime<Utc>,
    /// Pending value moved onto the contact, when there was one
    pub confirmed_value: Option<String>,
    /// Change request with `new_value` cleared, when there was one
    pub completed_change: Option<ChangeRequest>,
}

/// A profile change: one channel loses verification and a change request is appended
///
/// The store clears only `change.channel`'s verification and deactivates the
/// account; the other channel is left as stored.
#[derive(Debug, Clone)]
pub struct PendingChange {
    pub change: ChangeRequest,
    pub reset_at: DateTime<Utc>,
}

/// Repository trait for identity persistence operations
///
/// Unique-constraint violations on email, mobile or national code must surface as
/// `DomainError::DuplicateIdentifier` naming the field, whether they were caught by
/// a pre-check or by the store's own constraint.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Find a live contact by normalized email
    async fn find_contact_by_email(&self, email: &str) -> Result<Option<Contact>, DomainError>;

    /// Find a live contact by normalized mobile
    async fn find_contact_by_mobile(&self, mobile: &str) -> Result<Option<Contact>, DomainError>;

    /// Find a person by national code
    async fn find_person_by_national_code(
        &self,
        code: &NationalCode,
    ) -> Result<Option<Person>, DomainError>;

    async fn find_contact(&self, id: Uuid) -> Result<Option<Contact>, DomainError>;

    async fn find_customer(&self, id: Uuid) -> Result<Option<Customer>, DomainError>;

    async fn find_customer_by_contact(
        &self,
        contact_id: Uuid,
    ) -> Result<Option<Customer>, DomainError>;

    async fn find_owner(&self, owner: OwnerRef) -> Result<Option<Owner>, DomainError>;

    /// Atomically create person, contact, customer and both change placeholders
    ///
    /// # Returns
    /// * `Ok(RegistrationBundle)` - The stored records, sequences assigned
    /// * `Err(DomainError::DuplicateIdentifier)` - A unique field is taken; nothing was written
    async fn create_registration(
        &self,
        bundle: RegistrationBundle,
    ) -> Result<RegistrationBundle, DomainError>;

    async fn update_contact(&self, contact: &Contact) -> Result<(), DomainError>;

    async fn update_customer(&self, customer: &Customer) -> Result<(), DomainError>;

    async fn update_person(&self, person: &Person) -> Result<(), DomainError>;

    /// Mark a customer and its contact deleted
    ///
    /// # Returns
    /// * `Ok(true)` - The customer was live and is now deleted
    /// * `Ok(false)` - No live customer with that id
    async fn soft_delete_customer(&self, id: Uuid, at: DateTime<Utc>)
        -> Result<bool, DomainError>;

    /// Most recent change request, by `(created_at, sequence)`
    async fn latest_change_request(
        &self,
        customer_id: Uuid,
        channel: Channel,
    ) -> Result<Option<ChangeRequest>, DomainError>;

    async fn update_change_request(&self, change: &ChangeRequest) -> Result<(), DomainError>;

    /// Reset the channel's verification and append the change request in one unit
    async fn record_pending_change(
        &self,
        pending: PendingChange,
    ) -> Result<ChangeRequest, DomainError>;

    /// Store a ticket, assigning its sequence
    async fn create_ticket(
        &self,
        ticket: VerificationTicket,
    ) -> Result<VerificationTicket, DomainError>;

    /// All outstanding tickets for the channel, newest first
    async fn list_tickets(
        &self,
        customer_id: Uuid,
        channel: Channel,
    ) -> Result<Vec<VerificationTicket>, DomainError>;

    /// Newest outstanding ticket for the channel
    async fn latest_ticket(
        &self,
        customer_id: Uuid,
        channel: Channel,
    ) -> Result<Option<VerificationTicket>, DomainError> {
        Ok(self
            .list_tickets(customer_id, channel)
            .await?
            .into_iter()
            .next())
    }

    /// Apply a confirmation: consume the ticket, delete the channel's other
    /// tickets, mark the channel verified, activate the account and apply the
    /// pending value
    ///
    /// # Returns
    /// * `Ok(Customer)` - The customer as stored after the commit
    /// * `Err(VerificationError::TicketNotFound)` - The ticket was already consumed
    /// * `Err(DomainError::DuplicateIdentifier)` - The pending value was taken meanwhile
    async fn commit_verification(
        &self,
        commit: VerificationCommit,
    ) -> Result<Customer, DomainError>;
}
