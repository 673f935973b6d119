//! End-to-end flows across registration, verification, sign-in and sessions

use ident_core::{
    AuthService, AuthServiceConfig, ChangePasswordRequest, CredentialVerifier, DomainError,
    ErrorKind, FixedCodeGenerator, InMemoryIdentityStore, LoginRateLimiter, MemoryCache,
    PasswordHasher, PasswordPolicy, ProfileService, ProfileUpdate, RecordingNotificationSink,
    RegistrationRequest, RegistrationService, SessionConfig, SessionIssuer, SignInRequest,
    StaticCaptchaVerifier, VerificationServiceConfig, VerificationWorkflow,
};
use ident_shared::utils::clock::ManualClock;
use ident_shared::ErrorResponse;
use std::sync::Arc;

type Store = InMemoryIdentityStore;
type Sink = RecordingNotificationSink;

struct App {
    clock: ManualClock,
    sink: Arc<Sink>,
    sessions: Arc<SessionIssuer<MemoryCache>>,
    verification: Arc<VerificationWorkflow<Store, MemoryCache, Sink>>,
    registration: RegistrationService<Store, MemoryCache, Sink>,
    auth: AuthService<Store, MemoryCache, StaticCaptchaVerifier>,
    profiles: ProfileService<Store, MemoryCache, Sink>,
}

fn app() -> App {
    let clock = ManualClock::starting_now();
    let store = Arc::new(Store::new());
    let cache = Arc::new(MemoryCache::with_clock(Arc::new(clock.clone())));
    let sink = Arc::new(Sink::new());
    let hasher = PasswordHasher::new(4);

    let sessions = Arc::new(SessionIssuer::new(
        cache.clone(),
        SessionConfig::default(),
        Arc::new(clock.clone()),
    ));
    let verification = Arc::new(VerificationWorkflow::new(
        store.clone(),
        sessions.clone(),
        sink.clone(),
        Arc::new(FixedCodeGenerator(4321)),
        Arc::new(clock.clone()),
        VerificationServiceConfig::default(),
    ));
    let registration = RegistrationService::new(
        store.clone(),
        verification.clone(),
        hasher.clone(),
        PasswordPolicy::default(),
        Arc::new(clock.clone()),
    );
    let auth_config = AuthServiceConfig::default();
    let auth = AuthService::new(
        store.clone(),
        Arc::new(CredentialVerifier::new(store.clone(), hasher)),
        Arc::new(LoginRateLimiter::new(cache, &auth_config)),
        sessions.clone(),
        Arc::new(StaticCaptchaVerifier::accepting()),
        PasswordPolicy::default(),
        Arc::new(clock.clone()),
        auth_config,
    );
    let profiles = ProfileService::new(store, verification.clone(), Arc::new(clock.clone()));

    App {
        clock,
        sink,
        sessions,
        verification,
        registration,
        auth,
        profiles,
    }
}

fn sign_in(mobile: &str, password: &str) -> SignInRequest {
    SignInRequest {
        mobile: Some(mobile.to_string()),
        password: password.to_string(),
        source: "192.0.2.10".to_string(),
        ..SignInRequest::default()
    }
}

#[tokio::test]
async fn test_mobile_sign_up_to_sign_out() {
    let app = app();

    let registration = app
        .registration
        .register(RegistrationRequest {
            mobile: Some("09121234567".to_string()),
            national_code: "0012345679".to_string(),
            password: "secret123".to_string(),
            agree_with_policy: true,
            ..RegistrationRequest::default()
        })
        .await
        .unwrap();
    let customer_id = registration.customer.id;

    // inactive until the code is confirmed
    let err = app
        .auth
        .sign_in(sign_in("09121234567", "secret123"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    let code = app.sink.last_sms().unwrap().code;
    let confirmed = app
        .verification
        .confirm_mobile(customer_id, &code)
        .await
        .unwrap();
    assert!(app.sessions.validate_access(&confirmed.access_token).await.is_ok());

    let tokens = app
        .auth
        .sign_in(sign_in("+989121234567", "secret123"))
        .await
        .unwrap();

    // refresh works until sign-out
    let access = app.sessions.refresh(&tokens.refresh_token).await.unwrap();
    assert!(app.sessions.validate_access(&access).await.is_ok());

    app.auth.sign_out(&tokens.refresh_token).await.unwrap();
    let err = app.sessions.refresh(&tokens.refresh_token).await.unwrap_err();
    let response = ErrorResponse::from(&err);
    assert_eq!(response.error, "INVALID_TOKEN");
    assert_eq!(response.message, "token is invalid or expired");
}

#[tokio::test]
async fn test_lockout_hides_correct_password() {
    let app = app();
    let registration = app
        .registration
        .register(RegistrationRequest {
            mobile: Some("09121234567".to_string()),
            national_code: "0012345679".to_string(),
            password: "secret123".to_string(),
            agree_with_policy: true,
            ..RegistrationRequest::default()
        })
        .await
        .unwrap();
    app.verification
        .confirm_mobile(registration.customer.id, "4321")
        .await
        .unwrap();

    for _ in 0..4 {
        let err = app
            .auth
            .sign_in(sign_in("09121234567", "nope12345"))
            .await
            .unwrap_err();
        assert_eq!(ErrorResponse::from(&err).error, "INVALID_CREDENTIALS");
    }

    let err = app
        .auth
        .sign_in(sign_in("09121234567", "secret123"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RateLimited);
    assert_eq!(err.retry_after_seconds(), Some(600));

    app.clock.advance_secs(601);
    assert!(app
        .auth
        .sign_in(sign_in("09121234567", "secret123"))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_password_change_and_profile_reverification() {
    let app = app();
    let registration = app
        .registration
        .register(RegistrationRequest {
            email: Some("user@example.com".to_string()),
            national_code: "0012345679".to_string(),
            password: "secret123".to_string(),
            agree_with_policy: true,
            ..RegistrationRequest::default()
        })
        .await
        .unwrap();
    let customer_id = registration.customer.id;
    let ticket = registration.ticket.unwrap();
    let tokens = app
        .verification
        .confirm_email(customer_id, ticket.ticket_id)
        .await
        .unwrap();

    app.auth
        .change_password(
            customer_id,
            ChangePasswordRequest {
                old_password: "secret123".to_string(),
                new_password: "another456".to_string(),
                confirm_password: "another456".to_string(),
                refresh: tokens.refresh_token.clone(),
            },
        )
        .await
        .unwrap();
    assert!(matches!(
        app.sessions.validate_refresh(&tokens.refresh_token).await,
        Err(DomainError::Token(_))
    ));

    let outcome = app
        .profiles
        .update_profile(
            customer_id,
            ProfileUpdate {
                mobile: Some("09351112233".to_string()),
                ..ProfileUpdate::default()
            },
        )
        .await
        .unwrap();
    assert!(!outcome.profile.is_active);
    assert!(outcome.profile.email_verify.is_some());
    assert!(outcome.profile.mobile_verify.is_none());

    let email_sign_in = SignInRequest {
        email: Some("user@example.com".to_string()),
        password: "another456".to_string(),
        source: "192.0.2.10".to_string(),
        ..SignInRequest::default()
    };
    let err = app.auth.sign_in(email_sign_in.clone()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    app.verification
        .confirm_mobile(customer_id, "4321")
        .await
        .unwrap();
    assert!(app.auth.sign_in(email_sign_in).await.is_ok());
    assert!(app
        .auth
        .sign_in(sign_in("09351112233", "another456"))
        .await
        .is_ok());
}
