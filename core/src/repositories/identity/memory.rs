//! In-memory identity store
//!
//! A single lock guards all tables, which makes every trait method atomic. Used by
//! the service tests and by local runs without MySQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::r#trait::{IdentityStore, PendingChange, RegistrationBundle, VerificationCommit};
use crate::domain::entities::{
    ChangeRequest, Company, Contact, Customer, Owner, OwnerKind, OwnerRef, Person,
    VerificationTicket,
};
use crate::domain::value_objects::{Channel, NationalCode};
use crate::errors::{DomainError, VerificationError};

#[derive(Default)]
struct Tables {
    persons: HashMap<Uuid, Person>,
    companies: HashMap<Uuid, Company>,
    contacts: HashMap<Uuid, Contact>,
    customers: HashMap<Uuid, Customer>,
    change_requests: Vec<ChangeRequest>,
    tickets: Vec<VerificationTicket>,
    next_sequence: u64,
}

impl Tables {
    fn next_sequence(&mut self) -> u64 {
        self.next_sequence += 1;
        self.next_sequence
    }

    /// Uniqueness over all contacts, deleted ones included
    fn check_contact_unique(&self, contact: &Contact) -> Result<(), DomainError> {
        for other in self.contacts.values().filter(|c| c.id != contact.id) {
            if contact.email.is_some() && other.email == contact.email {
                return Err(DomainError::duplicate("email"));
            }
            if contact.mobile.is_some() && other.mobile == contact.mobile {
                return Err(DomainError::duplicate("mobile"));
            }
        }
        Ok(())
    }

    fn check_person_unique(&self, person: &Person) -> Result<(), DomainError> {
        let taken = person.national_code.is_some()
            && self
                .persons
                .values()
                .any(|p| p.id != person.id && p.national_code == person.national_code);
        if taken {
            return Err(DomainError::duplicate("national_code"));
        }
        Ok(())
    }

    fn live_contact(&self, id: Uuid) -> Option<&Contact> {
        self.contacts.get(&id).filter(|c| !c.is_deleted())
    }

    fn live_customer(&self, id: Uuid) -> Option<&Customer> {
        self.customers.get(&id).filter(|c| !c.is_deleted())
    }
}

/// Identity store backed by process memory
#[derive(Default)]
pub struct InMemoryIdentityStore {
    tables: RwLock<Tables>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a company owner; companies are not created through sign-up
    pub async fn insert_company(&self, company: Company) {
        self.tables.write().await.companies.insert(company.id, company);
    }

    /// Number of stored contacts, including soft-deleted ones
    pub async fn contact_count(&self) -> usize {
        self.tables.read().await.contacts.len()
    }

    /// Number of stored persons
    pub async fn person_count(&self) -> usize {
        self.tables.read().await.persons.len()
    }

    /// Number of stored customers, including soft-deleted ones
    pub async fn customer_count(&self) -> usize {
        self.tables.read().await.customers.len()
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn find_contact_by_email(&self, email: &str) -> Result<Option<Contact>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .contacts
            .values()
            .find(|c| !c.is_deleted() && c.email.as_deref() == Some(email))
            .cloned())
    }

    async fn find_contact_by_mobile(&self, mobile: &str) -> Result<Option<Contact>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .contacts
            .values()
            .find(|c| !c.is_deleted() && c.mobile.as_deref() == Some(mobile))
            .cloned())
    }

    async fn find_person_by_national_code(
        &self,
        code: &NationalCode,
    ) -> Result<Option<Person>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .persons
            .values()
            .find(|p| p.national_code.as_ref() == Some(code))
            .cloned())
    }

    async fn find_contact(&self, id: Uuid) -> Result<Option<Contact>, DomainError> {
        Ok(self.tables.read().await.live_contact(id).cloned())
    }

    async fn find_customer(&self, id: Uuid) -> Result<Option<Customer>, DomainError> {
        Ok(self.tables.read().await.live_customer(id).cloned())
    }

    async fn find_customer_by_contact(
        &self,
        contact_id: Uuid,
    ) -> Result<Option<Customer>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .customers
            .values()
            .find(|c| !c.is_deleted() && c.contact_id == contact_id)
            .cloned())
    }

    async fn find_owner(&self, owner: OwnerRef) -> Result<Option<Owner>, DomainError> {
        let tables = self.tables.read().await;
        Ok(match owner.kind {
            OwnerKind::Person => tables.persons.get(&owner.id).cloned().map(Owner::Person),
            OwnerKind::Company => tables.companies.get(&owner.id).cloned().map(Owner::Company),
        })
    }

    async fn create_registration(
        &self,
        mut bundle: RegistrationBundle,
    ) -> Result<RegistrationBundle, DomainError> {
        let mut tables = self.tables.write().await;

        // every check before any insert
        tables.check_contact_unique(&bundle.contact)?;
        tables.check_person_unique(&bundle.person)?;

        bundle.email_change.sequence = tables.next_sequence();
        bundle.mobile_change.sequence = tables.next_sequence();

        tables.persons.insert(bundle.person.id, bundle.person.clone());
        tables.contacts.insert(bundle.contact.id, bundle.contact.clone());
        tables.customers.insert(bundle.customer.id, bundle.customer.clone());
        tables.change_requests.push(bundle.email_change.clone());
        tables.change_requests.push(bundle.mobile_change.clone());

        Ok(bundle)
    }

    async fn update_contact(&self, contact: &Contact) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        if !tables.contacts.contains_key(&contact.id) {
            return Err(DomainError::not_found("contact"));
        }
        tables.check_contact_unique(contact)?;
        tables.contacts.insert(contact.id, contact.clone());
        Ok(())
    }

    async fn update_customer(&self, customer: &Customer) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        match tables.customers.get_mut(&customer.id) {
            Some(existing) => {
                *existing = customer.clone();
                Ok(())
            }
            None => Err(DomainError::not_found("customer")),
        }
    }

    async fn update_person(&self, person: &Person) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        if !tables.persons.contains_key(&person.id) {
            return Err(DomainError::not_found("person"));
        }
        tables.check_person_unique(person)?;
        tables.persons.insert(person.id, person.clone());
        Ok(())
    }

    async fn soft_delete_customer(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;
        let contact_id = match tables.customers.get_mut(&id) {
            Some(customer) if !customer.is_deleted() => {
                customer.deleted_at = Some(at);
                customer.contact_id
            }
            _ => return Ok(false),
        };
        if let Some(contact) = tables.contacts.get_mut(&contact_id) {
            contact.deleted_at = Some(at);
        }
        Ok(true)
    }

    async fn latest_change_request(
        &self,
        customer_id: Uuid,
        channel: Channel,
    ) -> Result<Option<ChangeRequest>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .change_requests
            .iter()
            .filter(|c| c.customer_id == customer_id && c.channel == channel)
            .max_by_key(|c| c.recency())
            .cloned())
    }

    async fn update_change_request(&self, change: &ChangeRequest) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        match tables.change_requests.iter_mut().find(|c| c.id == change.id) {
            Some(existing) => {
                *existing = change.clone();
                Ok(())
            }
            None => Err(DomainError::not_found("change request")),
        }
    }

    async fn record_pending_change(
        &self,
        pending: PendingChange,
    ) -> Result<ChangeRequest, DomainError> {
        let mut tables = self.tables.write().await;
        let mut change = pending.change;
        match tables.customers.get_mut(&change.customer_id) {
            Some(customer) => customer.reset_verification(change.channel, pending.reset_at),
            None => return Err(DomainError::not_found("customer")),
        }
        change.sequence = tables.next_sequence();
        tables.change_requests.push(change.clone());
        Ok(change)
    }

    async fn create_ticket(
        &self,
        mut ticket: VerificationTicket,
    ) -> Result<VerificationTicket, DomainError> {
        let mut tables = self.tables.write().await;
        ticket.sequence = tables.next_sequence();
        tables.tickets.push(ticket.clone());
        Ok(ticket)
    }

    async fn list_tickets(
        &self,
        customer_id: Uuid,
        channel: Channel,
    ) -> Result<Vec<VerificationTicket>, DomainError> {
        let tables = self.tables.read().await;
        let mut tickets: Vec<VerificationTicket> = tables
            .tickets
            .iter()
            .filter(|t| t.customer_id == customer_id && t.channel == channel)
            .cloned()
            .collect();
        tickets.sort_by(|a, b| b.recency().cmp(&a.recency()));
        Ok(tickets)
    }

    async fn commit_verification(
        &self,
        commit: VerificationCommit,
    ) -> Result<Customer, DomainError> {
        let mut tables = self.tables.write().await;

        if !tables.tickets.iter().any(|t| t.id == commit.consumed_ticket) {
            return Err(VerificationError::TicketNotFound.into());
        }
        let contact_id = tables
            .live_customer(commit.customer_id)
            .map(|c| c.contact_id)
            .ok_or_else(|| DomainError::not_found("customer"))?;

        // validate against the stored row before anything is written
        let contact = match &commit.confirmed_value {
            Some(value) => {
                let mut contact = tables
                    .live_contact(contact_id)
                    .cloned()
                    .ok_or_else(|| DomainError::not_found("contact"))?;
                contact.set_value(commit.channel, Some(value.clone()), commit.verified_at);
                tables.check_contact_unique(&contact)?;
                Some(contact)
            }
            None => None,
        };

        tables.tickets.retain(|t| {
            !(t.customer_id == commit.customer_id && t.channel == commit.channel)
        });
        if let Some(contact) = contact {
            tables.contacts.insert(contact.id, contact);
        }
        if let Some(change) = commit.completed_change {
            if let Some(existing) = tables.change_requests.iter_mut().find(|c| c.id == change.id) {
                *existing = change;
            }
        }
        let customer = tables
            .customers
            .get_mut(&commit.customer_id)
            .ok_or_else(|| DomainError::not_found("customer"))?;
        customer.mark_verified(commit.channel, commit.verified_at);
        Ok(customer.clone())
    }
}
