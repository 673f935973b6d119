//! Wiring of the identity workflows onto MySQL, Redis and the delivery queue

use std::sync::Arc;
use tokio::task::JoinHandle;

use ident_core::services::{
    AuthService, AuthServiceConfig, CodeGenerator, CredentialVerifier, FixedCodeGenerator,
    LoginRateLimiter, PasswordHasher, PasswordPolicy, ProfileService, RandomCodeGenerator,
    RegistrationService, SessionConfig, SessionIssuer, VerificationServiceConfig,
    VerificationWorkflow,
};
use ident_shared::{AppConfig, Clock, SystemClock};

use crate::cache::RedisCache;
use crate::captcha::CaptchaGate;
use crate::database::{DatabasePool, MySqlIdentityStore};
use crate::notify::{JobQueueNotifier, LoggingEmailTransport, LoggingSmsTransport, QueueConfig};
use crate::InfrastructureError;

type Store = MySqlIdentityStore;
type Cache = RedisCache;
type Notifier = JobQueueNotifier;

/// Fully wired identity services backed by production adapters
pub struct Infrastructure {
    pub database: DatabasePool,
    pub cache: Arc<Cache>,
    pub sessions: Arc<SessionIssuer<Cache>>,
    pub credentials: Arc<CredentialVerifier<Store>>,
    pub verification: Arc<VerificationWorkflow<Store, Cache, Notifier>>,
    pub registration: RegistrationService<Store, Cache, Notifier>,
    pub auth: AuthService<Store, Cache, CaptchaGate>,
    pub profiles: ProfileService<Store, Cache, Notifier>,
    delivery_worker: JoinHandle<()>,
}

impl Infrastructure {
    /// Validate `config`, connect to MySQL and Redis, run migrations and start
    /// the delivery worker
    pub async fn connect(config: &AppConfig) -> Result<Self, InfrastructureError> {
        config
            .validate()
            .map_err(|e| InfrastructureError::Config(e.to_string()))?;

        let session_config = SessionConfig::try_from(&config.auth.jwt)
            .map_err(|e| InfrastructureError::Config(e.to_string()))?;
        let captcha = Arc::new(CaptchaGate::from_config(&config.auth.recaptcha)?);

        let database = DatabasePool::new(config.database.clone()).await?;
        database.run_migrations().await?;
        let store = Arc::new(MySqlIdentityStore::new(database.get_pool().clone()));
        let cache = Arc::new(RedisCache::connect(config.cache.clone()).await?);

        let (notifier, delivery_worker) = JobQueueNotifier::spawn(
            Arc::new(LoggingEmailTransport),
            Arc::new(LoggingSmsTransport),
            QueueConfig::default(),
        );
        let notifier = Arc::new(notifier);

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let codes: Arc<dyn CodeGenerator> = match config.verification.fixed_otp_code {
            Some(code) => {
                tracing::warn!(event = "fixed_otp_enabled", "Issuing a fixed OTP code");
                Arc::new(FixedCodeGenerator(code))
            }
            None => Arc::new(RandomCodeGenerator),
        };
        let hasher = PasswordHasher::from(&config.auth.password);
        let password_policy = PasswordPolicy::from(&config.auth.password);
        let auth_config = AuthServiceConfig::from(&config.auth);

        let sessions = Arc::new(SessionIssuer::new(cache.clone(), session_config, clock.clone()));
        let credentials = Arc::new(CredentialVerifier::new(store.clone(), hasher.clone()));
        let verification = Arc::new(VerificationWorkflow::new(
            store.clone(),
            sessions.clone(),
            notifier,
            codes,
            clock.clone(),
            VerificationServiceConfig::from(&config.verification),
        ));
        let registration = RegistrationService::new(
            store.clone(),
            verification.clone(),
            hasher,
            password_policy.clone(),
            clock.clone(),
        );
        let auth = AuthService::new(
            store.clone(),
            credentials.clone(),
            Arc::new(LoginRateLimiter::new(cache.clone(), &auth_config)),
            sessions.clone(),
            captcha,
            password_policy,
            clock.clone(),
            auth_config,
        );
        let profiles = ProfileService::new(store, verification.clone(), clock);

        tracing::info!(
            event = "identity_services_ready",
            environment = %config.environment,
            "Identity services wired"
        );

        Ok(Self {
            database,
            cache,
            sessions,
            credentials,
            verification,
            registration,
            auth,
            profiles,
            delivery_worker,
        })
    }

    /// Stop accepting work, flush queued deliveries and close the pool
    pub async fn shutdown(self) {
        let Infrastructure {
            database,
            cache,
            sessions,
            credentials,
            verification,
            registration,
            auth,
            profiles,
            delivery_worker,
        } = self;

        // the worker exits once every notifier handle is gone
        drop((registration, auth, profiles, verification, credentials, sessions, cache));
        if let Err(e) = delivery_worker.await {
            tracing::error!(event = "delivery_worker_join_failed", error = %e, "Delivery worker panicked");
        }
        database.close().await;
    }
}
