//! Registration service implementation

use ident_shared::utils::clock::Clock;
use std::sync::Arc;

use crate::domain::entities::{ChangeRequest, Contact, Customer, OwnerRef, Person};
use crate::domain::value_objects::{Channel, LoginIdentifier, NationalCode};
use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::repositories::{CacheStore, IdentityStore, RegistrationBundle};
use crate::services::credentials::{PasswordHasher, PasswordPolicy};
use crate::services::verification::{NotificationSink, VerificationWorkflow};

use super::types::{Registration, RegistrationRequest};

/// Creates person, contact and customer in one unit and starts verification
pub struct RegistrationService<S, C, N>
where
    S: IdentityStore,
    C: CacheStore,
    N: NotificationSink,
{
    store: Arc<S>,
    verification: Arc<VerificationWorkflow<S, C, N>>,
    hasher: PasswordHasher,
    password_policy: PasswordPolicy,
    clock: Arc<dyn Clock>,
}

impl<S, C, N> RegistrationService<S, C, N>
where
    S: IdentityStore,
    C: CacheStore,
    N: NotificationSink,
{
    pub fn new(
        store: Arc<S>,
        verification: Arc<VerificationWorkflow<S, C, N>>,
        hasher: PasswordHasher,
        password_policy: PasswordPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            verification,
            hasher,
            password_policy,
            clock,
        }
    }

    /// Register a new customer
    ///
    /// This method:
    /// 1. Validates the identifier, national code, password and policy agreement
    /// 2. Rejects identifiers and national codes already in use
    /// 3. Writes person, contact, inactive customer and both change placeholders atomically
    /// 4. Starts the verification cycle for the supplied channel
    ///
    /// The store's uniqueness check is authoritative: a concurrent sign-up with the
    /// same values fails with the same `DuplicateIdentifier` as the pre-check.
    pub async fn register(&self, request: RegistrationRequest) -> DomainResult<Registration> {
        let identifier =
            LoginIdentifier::from_parts(request.email.as_deref(), request.mobile.as_deref())?;
        let national_code = NationalCode::parse(&request.national_code)?;
        self.password_policy.check(&request.password)?;
        if !request.agree_with_policy {
            return Err(ValidationError::PolicyNotAccepted.into());
        }

        self.ensure_unused(&identifier, &national_code).await?;

        let now = self.clock.now();
        let password_hash = self.hasher.hash(&request.password)?;
        let person = Person::new(Some(national_code), now);
        let owner = OwnerRef::person(person.id);
        let contact = Contact::new(owner, &identifier, now);
        let customer = Customer::new(contact.id, owner, password_hash, now);

        let bundle = self
            .store
            .create_registration(RegistrationBundle {
                email_change: ChangeRequest::placeholder(customer.id, Channel::Email, now),
                mobile_change: ChangeRequest::placeholder(customer.id, Channel::Mobile, now),
                person,
                contact,
                customer,
            })
            .await?;

        tracing::info!(
            customer_id = %bundle.customer.id,
            channel = %identifier.channel(),
            identifier = %identifier.masked(),
            event = "customer_registered",
            "Customer registered"
        );

        let started = match identifier.channel() {
            Channel::Email => self.verification.start_email_cycle(bundle.customer.id).await,
            Channel::Mobile => self.verification.start_mobile_cycle(bundle.customer.id).await,
        };
        let ticket = match started {
            Ok(ticket) => Some(ticket),
            Err(e) => {
                tracing::error!(
                    customer_id = %bundle.customer.id,
                    error = %e,
                    event = "initial_verification_failed",
                    "Could not start verification after registration"
                );
                None
            }
        };

        Ok(Registration {
            customer: bundle.customer,
            contact: bundle.contact,
            person: bundle.person,
            ticket,
        })
    }

    async fn ensure_unused(
        &self,
        identifier: &LoginIdentifier,
        national_code: &NationalCode,
    ) -> DomainResult<()> {
        let taken = match identifier {
            LoginIdentifier::Email(email) => self.store.find_contact_by_email(email).await?,
            LoginIdentifier::Mobile(mobile) => self.store.find_contact_by_mobile(mobile).await?,
        };
        if taken.is_some() {
            return Err(DomainError::duplicate(identifier.channel().as_str()));
        }
        if self
            .store
            .find_person_by_national_code(national_code)
            .await?
            .is_some()
        {
            return Err(DomainError::duplicate("national_code"));
        }
        Ok(())
    }
}
