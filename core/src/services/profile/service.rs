//! Profile service implementation

use ident_shared::utils::clock::Clock;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Contact, Customer, Owner};
use crate::domain::value_objects::{Channel, LoginIdentifier, NationalCode};
use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::repositories::{CacheStore, IdentityStore};
use crate::services::verification::{NotificationSink, VerificationWorkflow};

use super::types::{ContactDetails, CustomerProfile, ProfileUpdate, ProfileUpdateOutcome};

/// Reads and updates customer profiles
///
/// Email and mobile changes do not touch the contact directly: they become
/// pending change requests that are applied once the new value is verified.
pub struct ProfileService<S, C, N>
where
    S: IdentityStore,
    C: CacheStore,
    N: NotificationSink,
{
    store: Arc<S>,
    verification: Arc<VerificationWorkflow<S, C, N>>,
    clock: Arc<dyn Clock>,
}

impl<S, C, N> ProfileService<S, C, N>
where
    S: IdentityStore,
    C: CacheStore,
    N: NotificationSink,
{
    pub fn new(
        store: Arc<S>,
        verification: Arc<VerificationWorkflow<S, C, N>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            verification,
            clock,
        }
    }

    pub async fn get_profile(&self, customer_id: Uuid) -> DomainResult<CustomerProfile> {
        let customer = self.load_customer(customer_id).await?;
        let contact = self.load_contact(&customer).await?;
        self.build_profile(customer, &contact).await
    }

    /// Apply a partial update
    ///
    /// Every supplied field is validated before anything is written. A new email or
    /// mobile puts that channel back into pending confirmation and starts a cycle
    /// for the new value; supplying the current value changes nothing.
    pub async fn update_profile(
        &self,
        customer_id: Uuid,
        update: ProfileUpdate,
    ) -> DomainResult<ProfileUpdateOutcome> {
        let customer = self.load_customer(customer_id).await?;
        let contact = self.load_contact(&customer).await?;

        let email = match update.email.as_deref() {
            Some(raw) => Some(LoginIdentifier::email(raw)?),
            None => None,
        };
        let mobile = match update.mobile.as_deref() {
            Some(raw) => Some(LoginIdentifier::mobile(raw)?),
            None => None,
        };
        let national_code = match update.national_code.as_deref() {
            Some(raw) => Some(NationalCode::parse(raw)?),
            None => None,
        };

        // only values that differ from the contact trigger re-verification
        let changes: Vec<LoginIdentifier> = [email, mobile]
            .into_iter()
            .flatten()
            .filter(|id| contact.value(id.channel()) != Some(id.value()))
            .collect();
        for identifier in &changes {
            self.verification.ensure_available(&contact, identifier).await?;
        }

        let person_update =
            update.name.is_some() || update.last_name.is_some() || national_code.is_some();
        if person_update {
            let mut person = match self.store.find_owner(customer.owner).await? {
                Some(Owner::Person(person)) => person,
                Some(Owner::Company(_)) => {
                    return Err(ValidationError::InvalidFormat {
                        field: "owner".to_string(),
                    }
                    .into())
                }
                None => return Err(DomainError::not_found("owner")),
            };
            if let Some(code) = &national_code {
                if let Some(holder) = self.store.find_person_by_national_code(code).await? {
                    if holder.id != person.id {
                        return Err(DomainError::duplicate("national_code"));
                    }
                }
            }

            if let Some(name) = update.name {
                person.name = Some(name);
            }
            if let Some(last_name) = update.last_name {
                person.last_name = Some(last_name);
            }
            if national_code.is_some() {
                person.national_code = national_code;
            }
            person.updated_at = self.clock.now();
            self.store.update_person(&person).await?;
        }

        let mut started = Vec::with_capacity(changes.len());
        for identifier in changes {
            let ticket = match identifier {
                LoginIdentifier::Email(email) => {
                    self.verification.record_email_change(customer.id, &email).await?
                }
                LoginIdentifier::Mobile(mobile) => {
                    self.verification
                        .record_mobile_change(customer.id, &mobile)
                        .await?
                }
            };
            started.push(ticket);
        }

        tracing::info!(
            customer_id = %customer.id,
            reverification = started.len(),
            event = "profile_updated",
            "Profile updated"
        );

        let profile = self.get_profile(customer.id).await?;
        Ok(ProfileUpdateOutcome { profile, started })
    }

    async fn build_profile(
        &self,
        customer: Customer,
        contact: &Contact,
    ) -> DomainResult<CustomerProfile> {
        let owner = self.store.find_owner(customer.owner).await?;
        let email_change = self
            .store
            .latest_change_request(customer.id, Channel::Email)
            .await?;
        let mobile_change = self
            .store
            .latest_change_request(customer.id, Channel::Mobile)
            .await?;

        Ok(CustomerProfile {
            id: customer.id,
            is_active: customer.is_active,
            email_verify: customer.email_verify,
            mobile_verify: customer.mobile_verify,
            total_credit: customer.total_credit,
            contact: ContactDetails::from(contact),
            owner,
            email_change,
            mobile_change,
        })
    }

    async fn load_customer(&self, customer_id: Uuid) -> DomainResult<Customer> {
        self.store
            .find_customer(customer_id)
            .await?
            .ok_or_else(|| DomainError::not_found("customer"))
    }

    async fn load_contact(&self, customer: &Customer) -> DomainResult<Contact> {
        self.store
            .find_contact(customer.contact_id)
            .await?
            .ok_or_else(|| DomainError::not_found("contact"))
    }
}
