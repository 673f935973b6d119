//! Unit tests for domain error types

use ident_shared::errors::{error_codes, ErrorResponse};

use crate::domain::value_objects::Channel;
use crate::errors::{
    AuthError, DomainError, ErrorKind, TokenError, ValidationError, VerificationError,
};

#[test]
fn test_sign_in_failures_are_indistinguishable() {
    let unknown: ErrorResponse = DomainError::from(AuthError::UnknownIdentifier).into();
    let wrong_password: ErrorResponse = DomainError::from(AuthError::InvalidCredentials).into();

    assert_eq!(unknown.error, error_codes::INVALID_CREDENTIALS);
    assert_eq!(unknown.error, wrong_password.error);
    assert_eq!(unknown.message, wrong_password.message);
}

#[test]
fn test_token_errors_surface_generically() {
    for err in [TokenError::Expired, TokenError::Malformed, TokenError::Revoked] {
        let response: ErrorResponse = DomainError::from(err).into();
        assert_eq!(response.error, error_codes::INVALID_TOKEN);
        assert_eq!(response.message, "token is invalid or expired");
    }
}

#[test]
fn test_validation_error_carries_field() {
    let response: ErrorResponse = DomainError::from(ValidationError::InvalidNationalCode).into();
    assert_eq!(response.error, error_codes::VALIDATION_ERROR);
    let details = response.details.unwrap();
    assert!(details["fields"].get("national_code").is_some());
}

#[test]
fn test_duplicate_identifier_names_field() {
    let err = DomainError::duplicate("mobile");
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let response: ErrorResponse = err.into();
    assert_eq!(response.error, error_codes::CONFLICT);
    assert!(response.details.unwrap()["fields"].get("mobile").is_some());
}

#[test]
fn test_resend_too_soon_includes_remaining_time() {
    let err = DomainError::from(VerificationError::ResendTooSoon {
        channel: Channel::Email,
        remaining_seconds: 37,
    });
    assert_eq!(err.kind(), ErrorKind::RateLimited);
    assert_eq!(err.retry_after_seconds(), Some(37));

    let response: ErrorResponse = err.into();
    assert_eq!(response.error, error_codes::RATE_LIMITED);
    assert_eq!(response.details.unwrap()["retry_after_seconds"], 37);
}

#[test]
fn test_lockout_is_rate_limited() {
    let err = DomainError::from(AuthError::LockedOut {
        retry_after_seconds: 540,
    });
    assert_eq!(err.kind(), ErrorKind::RateLimited);
    assert_eq!(err.retry_after_seconds(), Some(540));
}

#[test]
fn test_verification_kinds() {
    assert_eq!(
        DomainError::from(VerificationError::TicketExpired).kind(),
        ErrorKind::Expired
    );
    assert_eq!(
        DomainError::from(VerificationError::TicketNotFound).kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        DomainError::from(VerificationError::AlreadyVerified {
            channel: Channel::Mobile
        })
        .kind(),
        ErrorKind::Validation
    );
}

#[test]
fn test_internal_details_are_hidden() {
    let response: ErrorResponse = DomainError::internal("connection refused on 10.0.0.3").into();
    assert_eq!(response.error, error_codes::INTERNAL_ERROR);
    assert!(!response.message.contains("10.0.0.3"));
}
