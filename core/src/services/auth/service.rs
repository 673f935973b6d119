//! Main authentication service implementation

use ident_shared::utils::clock::Clock;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::TokenPair;
use crate::domain::value_objects::LoginIdentifier;
use crate::errors::{AuthError, DomainError, DomainResult, ValidationError};
use crate::repositories::{CacheStore, IdentityStore};
use crate::services::credentials::{CredentialVerifier, PasswordPolicy};
use crate::services::session::SessionIssuer;

use super::config::AuthServiceConfig;
use super::rate_limiter::LoginRateLimiter;
use super::traits::CaptchaVerifier;
use super::types::{ChangePasswordRequest, SignInRequest};

/// Authentication service: sign-in gate, sign-out and password change
pub struct AuthService<S, C, V>
where
    S: IdentityStore,
    C: CacheStore,
    V: CaptchaVerifier,
{
    /// Identity store, used to persist login time and password changes
    store: Arc<S>,
    /// Password checks against stored hashes
    credentials: Arc<CredentialVerifier<S>>,
    /// Failed attempt counters
    rate_limiter: Arc<LoginRateLimiter<C>>,
    /// Token issuance and revocation
    sessions: Arc<SessionIssuer<C>>,
    /// reCAPTCHA verdicts, consulted only when enabled
    captcha: Arc<V>,
    password_policy: PasswordPolicy,
    clock: Arc<dyn Clock>,
    config: AuthServiceConfig,
}

impl<S, C, V> AuthService<S, C, V>
where
    S: IdentityStore,
    C: CacheStore,
    V: CaptchaVerifier,
{
    /// Create a new authentication service
    ///
    /// # Arguments
    ///
    /// * `store` - Identity persistence
    /// * `credentials` - Credential verifier sharing the same store
    /// * `rate_limiter` - Lockout counters
    /// * `sessions` - Session issuer
    /// * `captcha` - reCAPTCHA verifier
    /// * `password_policy` - Rules for new passwords
    /// * `clock` - Time source
    /// * `config` - Service configuration
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<S>,
        credentials: Arc<CredentialVerifier<S>>,
        rate_limiter: Arc<LoginRateLimiter<C>>,
        sessions: Arc<SessionIssuer<C>>,
        captcha: Arc<V>,
        password_policy: PasswordPolicy,
        clock: Arc<dyn Clock>,
        config: AuthServiceConfig,
    ) -> Self {
        Self {
            store,
            credentials,
            rate_limiter,
            sessions,
            captcha,
            password_policy,
            clock,
            config,
        }
    }

    /// Sign in with email or mobile and a password
    ///
    /// This method:
    /// 1. Resolves exactly one login identifier
    /// 2. Checks reCAPTCHA when enabled
    /// 3. Rejects locked (identifier, source) pairs before looking at the password
    /// 4. Verifies the password, counting failures
    /// 5. Clears the failure counter and issues a token pair
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - Access and refresh tokens
    /// * `Err(AuthError::LockedOut)` - Too many failures; carries the remaining wait
    /// * `Err(AuthError::InvalidCredentials)` - Unknown identifier or wrong password
    /// * `Err(AuthError::AccountDisabled)` - Correct password, inactive account
    pub async fn sign_in(&self, request: SignInRequest) -> DomainResult<TokenPair> {
        let identifier =
            LoginIdentifier::from_parts(request.email.as_deref(), request.mobile.as_deref())?;

        if self.config.recaptcha_enabled {
            let token = request
                .recaptcha
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .ok_or_else(|| ValidationError::RequiredField {
                    field: "recaptcha".to_string(),
                })?;
            if !self.captcha.verify(token).await {
                tracing::info!(
                    identifier = %identifier.masked(),
                    event = "captcha_rejected",
                    "reCAPTCHA rejected sign-in"
                );
                return Err(AuthError::CaptchaRejected.into());
            }
        }

        let key = identifier.value();
        self.rate_limiter.check(key, &request.source).await?;

        let mut customer = match self
            .credentials
            .authenticate(&identifier, &request.password)
            .await
        {
            Ok(customer) => customer,
            Err(DomainError::Auth(AuthError::UnknownIdentifier))
            | Err(DomainError::Auth(AuthError::InvalidCredentials)) => {
                let failures = self
                    .rate_limiter
                    .record_failure(key, &request.source)
                    .await?;
                tracing::info!(
                    identifier = %identifier.masked(),
                    source = %request.source,
                    failures,
                    event = "sign_in_failed",
                    "Sign-in failed"
                );
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        self.rate_limiter.clear(key, &request.source).await?;

        if !customer.is_active {
            tracing::info!(
                customer_id = %customer.id,
                event = "sign_in_inactive",
                "Inactive customer tried to sign in"
            );
            return Err(AuthError::AccountDisabled.into());
        }

        let tokens = self.sessions.issue_pair(&customer)?;

        customer.record_login(self.clock.now());
        self.store.update_customer(&customer).await?;

        tracing::info!(
            customer_id = %customer.id,
            event = "sign_in_succeeded",
            "Customer signed in"
        );
        Ok(tokens)
    }

    /// Sign out by revoking the refresh token
    pub async fn sign_out(&self, refresh_token: &str) -> DomainResult<()> {
        self.sessions.revoke(refresh_token).await
    }

    /// Change the password of an authenticated customer
    ///
    /// The supplied refresh token is revoked after the new password is stored. A
    /// bad refresh token is reported even though the password has already changed.
    pub async fn change_password(
        &self,
        customer_id: Uuid,
        request: ChangePasswordRequest,
    ) -> DomainResult<()> {
        if request.new_password == request.old_password {
            return Err(ValidationError::SamePassword.into());
        }
        if request.confirm_password != request.new_password {
            return Err(ValidationError::PasswordMismatch.into());
        }
        self.password_policy.check(&request.new_password)?;

        let mut customer = self
            .store
            .find_customer(customer_id)
            .await?
            .ok_or_else(|| DomainError::not_found("customer"))?;

        let hasher = self.credentials.hasher();
        if !hasher.verify(&request.old_password, &customer.password_hash) {
            return Err(ValidationError::IncorrectPassword.into());
        }

        let hash = hasher.hash(&request.new_password)?;
        customer.set_password_hash(hash, self.clock.now());
        self.store.update_customer(&customer).await?;

        tracing::info!(
            customer_id = %customer.id,
            event = "password_changed",
            "Password changed"
        );

        self.sessions.revoke(&request.refresh).await
    }
}
