//! Resolving a login identifier to a customer and checking its password

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::Customer;
use crate::domain::value_objects::LoginIdentifier;
use crate::errors::{AuthError, DomainResult};
use crate::repositories::IdentityStore;

use super::password::PasswordHasher;

/// Checks passwords against stored hashes
pub struct CredentialVerifier<S: IdentityStore> {
    store: Arc<S>,
    hasher: PasswordHasher,
}

impl<S: IdentityStore> CredentialVerifier<S> {
    pub fn new(store: Arc<S>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    /// Authenticate by email or mobile
    ///
    /// Inactive customers authenticate successfully; whether they may sign in is
    /// the caller's decision.
    ///
    /// # Returns
    ///
    /// * `Ok(Customer)` - Password matches
    /// * `Err(AuthError::UnknownIdentifier)` - No live contact/customer for the identifier
    /// * `Err(AuthError::InvalidCredentials)` - Password does not match
    pub async fn authenticate(
        &self,
        identifier: &LoginIdentifier,
        password: &str,
    ) -> DomainResult<Customer> {
        let contact = match identifier {
            LoginIdentifier::Email(email) => self.store.find_contact_by_email(email).await?,
            LoginIdentifier::Mobile(mobile) => self.store.find_contact_by_mobile(mobile).await?,
        };

        let customer = match contact {
            Some(contact) => self.store.find_customer_by_contact(contact.id).await?,
            None => None,
        };

        let Some(customer) = customer else {
            self.hasher.verify_dummy(password);
            tracing::debug!(
                identifier = %identifier.masked(),
                event = "authenticate_unknown_identifier",
                "No customer for identifier"
            );
            return Err(AuthError::UnknownIdentifier.into());
        };

        if !self.hasher.verify(password, &customer.password_hash) {
            tracing::debug!(
                customer_id = %customer.id,
                event = "authenticate_password_mismatch",
                "Password mismatch"
            );
            return Err(AuthError::InvalidCredentials.into());
        }

        Ok(customer)
    }

    /// Load a customer for an authenticated request
    ///
    /// Missing, deleted and inactive customers all yield `None`.
    pub async fn get_user(&self, customer_id: Uuid) -> DomainResult<Option<Customer>> {
        Ok(self
            .store
            .find_customer(customer_id)
            .await?
            .filter(|customer| customer.is_active))
    }
}
