//! Verification workflow implementation

use chrono::Duration;
use constant_time_eq::constant_time_eq;
use ident_shared::utils::clock::Clock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{ChangeRequest, Contact, Customer, TokenPair, VerificationTicket};
use crate::domain::value_objects::{Channel, LoginIdentifier};
use crate::errors::{DomainError, DomainResult, VerificationError};
use crate::repositories::{CacheStore, IdentityStore, PendingChange, VerificationCommit};
use crate::services::session::SessionIssuer;

use super::config::VerificationServiceConfig;
use super::traits::{CodeGenerator, NotificationSink};
use super::types::{EmailMessage, IssuedTicket, SmsMessage, EMAIL_VERIFICATION_TEMPLATE};

/// Drives each customer's email and mobile channel through
/// `Unverified -> PendingConfirmation -> Verified`
///
/// Both channels follow the same rules and differ only in how the ticket is
/// proven: email tickets by the id carried in a link, mobile tickets by the
/// 4-digit code of the newest ticket. A confirmed channel activates the account
/// on its own. Changing a verified contact value puts the channel back into
/// `PendingConfirmation`.
pub struct VerificationWorkflow<S, C, N>
where
    S: IdentityStore,
    C: CacheStore,
    N: NotificationSink,
{
    store: Arc<S>,
    /// Issues tokens on successful confirmation
    sessions: Arc<SessionIssuer<C>>,
    /// Delivery queue for links and codes
    notifier: Arc<N>,
    codes: Arc<dyn CodeGenerator>,
    clock: Arc<dyn Clock>,
    config: VerificationServiceConfig,
}

impl<S, C, N> VerificationWorkflow<S, C, N>
where
    S: IdentityStore,
    C: CacheStore,
    N: NotificationSink,
{
    /// Create a new verification workflow
    ///
    /// # Arguments
    ///
    /// * `store` - Identity persistence
    /// * `sessions` - Session issuer for confirmation tokens
    /// * `notifier` - Fire-and-forget delivery of emails and SMS
    /// * `codes` - OTP generator
    /// * `clock` - Time source for ticket age
    /// * `config` - TTLs, cooldowns and change limits
    pub fn new(
        store: Arc<S>,
        sessions: Arc<SessionIssuer<C>>,
        notifier: Arc<N>,
        codes: Arc<dyn CodeGenerator>,
        clock: Arc<dyn Clock>,
        config: VerificationServiceConfig,
    ) -> Self {
        Self {
            store,
            sessions,
            notifier,
            codes,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &VerificationServiceConfig {
        &self.config
    }

    /// Issue an email ticket and send the verification link
    ///
    /// The link targets the pending change's new address when the channel is
    /// unverified and a change is pending, otherwise the contact's email.
    pub async fn start_email_cycle(&self, customer_id: Uuid) -> DomainResult<IssuedTicket> {
        let customer = self.load_customer(customer_id).await?;
        self.start_cycle(&customer, Channel::Email).await
    }

    /// Confirm an email ticket by id
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - Email verified, account active, tickets cleared
    /// * `Err(VerificationError::AlreadyVerified)` - Email was already verified
    /// * `Err(VerificationError::TicketNotFound)` - No outstanding ticket with that id
    /// * `Err(VerificationError::TicketExpired)` - Ticket is older than its TTL; nothing changes
    pub async fn confirm_email(
        &self,
        customer_id: Uuid,
        ticket_id: Uuid,
    ) -> DomainResult<TokenPair> {
        let customer = self.load_customer(customer_id).await?;
        Self::ensure_unverified(&customer, Channel::Email)?;

        let ticket = self
            .store
            .list_tickets(customer.id, Channel::Email)
            .await?
            .into_iter()
            .find(|t| t.id == ticket_id)
            .ok_or(VerificationError::TicketNotFound)?;
        self.ensure_fresh(&ticket)?;

        self.confirm(customer, ticket).await
    }

    /// Send a new link once the resend cooldown has passed
    pub async fn resend_email(&self, customer_id: Uuid) -> DomainResult<IssuedTicket> {
        self.resend(customer_id, Channel::Email).await
    }

    /// Replace an unverified email and send a link to the new address
    ///
    /// The contact's email changes immediately and stays unverified.
    pub async fn request_email_change(
        &self,
        customer_id: Uuid,
        email: &str,
    ) -> DomainResult<IssuedTicket> {
        let identifier = LoginIdentifier::email(email)?;
        self.request_change(customer_id, identifier).await
    }

    /// Issue an OTP ticket and send the code by SMS
    pub async fn start_mobile_cycle(&self, customer_id: Uuid) -> DomainResult<IssuedTicket> {
        let customer = self.load_customer(customer_id).await?;
        self.start_cycle(&customer, Channel::Mobile).await
    }

    /// Confirm the newest OTP ticket
    ///
    /// Expiry is checked before the code. A wrong code leaves every ticket in place.
    pub async fn confirm_mobile(&self, customer_id: Uuid, code: &str) -> DomainResult<TokenPair> {
        let customer = self.load_customer(customer_id).await?;
        Self::ensure_unverified(&customer, Channel::Mobile)?;

        let ticket = self
            .store
            .latest_ticket(customer.id, Channel::Mobile)
            .await?
            .ok_or(VerificationError::TicketNotFound)?;
        self.ensure_fresh(&ticket)?;

        let expected = ticket.code.map(format_code).unwrap_or_default();
        if expected.is_empty() || !constant_time_eq(expected.as_bytes(), code.trim().as_bytes()) {
            tracing::info!(
                customer_id = %customer.id,
                event = "otp_rejected",
                "Wrong verification code"
            );
            return Err(VerificationError::InvalidCode.into());
        }

        self.confirm(customer, ticket).await
    }

    /// Send a new code once the resend cooldown has passed
    pub async fn resend_mobile(&self, customer_id: Uuid) -> DomainResult<IssuedTicket> {
        self.resend(customer_id, Channel::Mobile).await
    }

    /// Replace an unverified mobile and send a code to the new number
    pub async fn request_mobile_change(
        &self,
        customer_id: Uuid,
        mobile: &str,
    ) -> DomainResult<IssuedTicket> {
        let identifier = LoginIdentifier::mobile(mobile)?;
        self.request_change(customer_id, identifier).await
    }

    /// Put the email channel back into pending confirmation for a new address
    ///
    /// Appends a change request, clears `email_verify`, deactivates the account and
    /// starts a cycle for the new address. The contact keeps its current email
    /// until the change is confirmed.
    pub async fn record_email_change(
        &self,
        customer_id: Uuid,
        email: &str,
    ) -> DomainResult<IssuedTicket> {
        let identifier = LoginIdentifier::email(email)?;
        self.record_change(customer_id, identifier).await
    }

    /// Mobile counterpart of [`record_email_change`](Self::record_email_change)
    pub async fn record_mobile_change(
        &self,
        customer_id: Uuid,
        mobile: &str,
    ) -> DomainResult<IssuedTicket> {
        let identifier = LoginIdentifier::mobile(mobile)?;
        self.record_change(customer_id, identifier).await
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

    fn ensure_unverified(customer: &Customer, channel: Channel) -> Result<(), VerificationError> {
        if customer.is_verified(channel) {
            return Err(VerificationError::AlreadyVerified { channel });
        }
        Ok(())
    }

    fn ensure_fresh(&self, ticket: &VerificationTicket) -> Result<(), VerificationError> {
        let ttl = self.config.ticket_ttl(ticket.channel);
        if ticket.is_expired(self.clock.now(), ttl) {
            return Err(VerificationError::TicketExpired);
        }
        Ok(())
    }

    async fn start_cycle(&self, customer: &Customer, channel: Channel) -> DomainResult<IssuedTicket> {
        let contact = self.load_contact(customer).await?;

        let pending = if customer.is_verified(channel) {
            None
        } else {
            self.store
                .latest_change_request(customer.id, channel)
                .await?
                .and_then(|change| change.pending_value().map(str::to_string))
        };
        let target = pending
            .or_else(|| contact.value(channel).map(str::to_string))
            .ok_or(VerificationError::MissingContact { channel })?;

        let now = self.clock.now();
        let ticket = match channel {
            Channel::Email => VerificationTicket::email(customer.id, target, now),
            Channel::Mobile => {
                VerificationTicket::otp(customer.id, target, self.codes.generate(), now)
            }
        };
        let ticket = self.store.create_ticket(ticket).await?;
        self.dispatch(&ticket).await;

        Ok(IssuedTicket {
            ticket_id: ticket.id,
            channel,
            expires_at: ticket.created_at + seconds(self.config.ticket_ttl(channel)),
            resend_available_at: ticket.created_at + seconds(self.config.resend_cooldown(channel)),
        })
    }

    async fn dispatch(&self, ticket: &VerificationTicket) {
        match ticket.channel {
            Channel::Email => {
                let url = self
                    .config
                    .verification_url(&ticket.customer_id.to_string(), &ticket.id.to_string());
                let context = HashMap::from([("verification_url".to_string(), url)]);
                self.notifier
                    .send_email(EmailMessage {
                        template: EMAIL_VERIFICATION_TEMPLATE.to_string(),
                        context,
                        recipients: vec![ticket.target.clone()],
                    })
                    .await;
            }
            Channel::Mobile => {
                self.notifier
                    .send_sms(SmsMessage {
                        customer_id: ticket.customer_id,
                        recipient: ticket.target.clone(),
                        code: ticket.code.map(format_code).unwrap_or_default(),
                    })
                    .await;
            }
        }

        tracing::info!(
            customer_id = %ticket.customer_id,
            ticket_id = %ticket.id,
            channel = %ticket.channel,
            target = %mask(ticket.channel, &ticket.target),
            event = "verification_ticket_issued",
            "Verification dispatched"
        );
    }

    async fn resend(&self, customer_id: Uuid, channel: Channel) -> DomainResult<IssuedTicket> {
        let customer = self.load_customer(customer_id).await?;
        Self::ensure_unverified(&customer, channel)?;

        let newest = self
            .store
            .latest_ticket(customer.id, channel)
            .await?
            .ok_or(VerificationError::NoPendingCycle)?;

        let cooldown = self.config.resend_cooldown(channel);
        if let Some(remaining_seconds) = newest.cooldown_remaining(self.clock.now(), cooldown) {
            return Err(VerificationError::ResendTooSoon {
                channel,
                remaining_seconds,
            }
            .into());
        }

        self.start_cycle(&customer, channel).await
    }

    async fn request_change(
        &self,
        customer_id: Uuid,
        identifier: LoginIdentifier,
    ) -> DomainResult<IssuedTicket> {
        let channel = identifier.channel();
        let new_value = identifier.value().to_string();

        let customer = self.load_customer(customer_id).await?;
        Self::ensure_unverified(&customer, channel)?;

        let tickets = self.store.list_tickets(customer.id, channel).await?;
        let targets: HashSet<&str> = tickets.iter().map(|t| t.target.as_str()).collect();
        let limit = self.config.change_limit(channel);
        if !targets.contains(new_value.as_str()) && targets.len() >= limit {
            tracing::info!(
                customer_id = %customer.id,
                channel = %channel,
                event = "change_limit_exceeded",
                "Too many distinct verification targets"
            );
            return Err(VerificationError::ChangeLimitExceeded { channel, limit }.into());
        }

        let mut contact = self.load_contact(&customer).await?;
        self.ensure_available(&contact, &identifier).await?;

        // a direct change supersedes whatever a profile update left pending
        if let Some(mut change) = self.store.latest_change_request(customer.id, channel).await? {
            if change.is_pending() {
                change.complete();
                self.store.update_change_request(&change).await?;
            }
        }

        contact.set_value(channel, Some(new_value), self.clock.now());
        self.store.update_contact(&contact).await?;

        tracing::info!(
            customer_id = %customer.id,
            channel = %channel,
            target = %identifier.masked(),
            event = "contact_changed_unverified",
            "Unverified contact value replaced"
        );

        self.start_cycle(&customer, channel).await
    }

    async fn record_change(
        &self,
        customer_id: Uuid,
        identifier: LoginIdentifier,
    ) -> DomainResult<IssuedTicket> {
        let channel = identifier.channel();
        let mut customer = self.load_customer(customer_id).await?;
        let contact = self.load_contact(&customer).await?;
        self.ensure_available(&contact, &identifier).await?;

        let now = self.clock.now();
        let change = ChangeRequest::new(
            customer.id,
            channel,
            contact.display_value(channel),
            identifier.value(),
            now,
        );
        self.store
            .record_pending_change(PendingChange {
                change,
                reset_at: now,
            })
            .await?;
        customer.reset_verification(channel, now);

        tracing::info!(
            customer_id = %customer.id,
            channel = %channel,
            target = %identifier.masked(),
            event = "contact_change_pending",
            "Contact change awaiting confirmation"
        );

        self.start_cycle(&customer, channel).await
    }

    /// Fail with `DuplicateIdentifier` when another contact holds the value
    pub(crate) async fn ensure_available(
        &self,
        contact: &Contact,
        identifier: &LoginIdentifier,
    ) -> DomainResult<()> {
        let holder = match identifier {
            LoginIdentifier::Email(email) => self.store.find_contact_by_email(email).await?,
            LoginIdentifier::Mobile(mobile) => self.store.find_contact_by_mobile(mobile).await?,
        };
        match holder {
            Some(other) if other.id != contact.id => {
                Err(DomainError::duplicate(identifier.channel().as_str()))
            }
            _ => Ok(()),
        }
    }

    /// Apply a proven ticket
    ///
    /// The ticket must have been sent to the value being confirmed: the pending
    /// change's new value, or else the contact's current value. A ticket issued
    /// for an earlier address is treated as unknown.
    async fn confirm(
        &self,
        customer: Customer,
        ticket: VerificationTicket,
    ) -> DomainResult<TokenPair> {
        let channel = ticket.channel;
        let now = self.clock.now();

        let mut completed_change = None;
        let mut confirmed_value = None;
        if let Some(mut change) = self.store.latest_change_request(customer.id, channel).await? {
            if let Some(value) = change.pending_value().map(str::to_string) {
                change.complete();
                completed_change = Some(change);
                confirmed_value = Some(value);
            }
        }
        let expected = match &confirmed_value {
            Some(value) => Some(value.clone()),
            None => self
                .load_contact(&customer)
                .await?
                .value(channel)
                .map(str::to_string),
        };
        if expected.as_deref() != Some(ticket.target.as_str()) {
            tracing::info!(
                customer_id = %customer.id,
                ticket_id = %ticket.id,
                channel = %channel,
                event = "stale_ticket_rejected",
                "Ticket was issued for a different address"
            );
            return Err(VerificationError::TicketNotFound.into());
        }

        let customer = self
            .store
            .commit_verification(VerificationCommit {
                customer_id: customer.id,
                channel,
                consumed_ticket: ticket.id,
                verified_at: now,
                confirmed_value,
                completed_change,
            })
            .await?;

        tracing::info!(
            customer_id = %customer.id,
            channel = %channel,
            event = "channel_verified",
            "Verification confirmed"
        );

        self.sessions.issue_pair(&customer)
    }
}

fn format_code(code: u16) -> String {
    format!("{:04}", code)
}

fn seconds(secs: u64) -> Duration {
    Duration::seconds(secs as i64)
}

fn mask(channel: Channel, value: &str) -> String {
    match channel {
        Channel::Email => ident_shared::utils::mask_email(value),
        Channel::Mobile => ident_shared::utils::mask_mobile(value),
    }
}
