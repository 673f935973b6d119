//! Error types for registration, verification, sign-in and token handling
//!
//! Messages here are the developer-facing `Display` text. What a caller sees is
//! decided by the `ErrorResponse` conversion in `response.rs`, which deliberately
//! hides some distinctions (unknown identifier vs. wrong password, expired vs.
//! revoked token).

use thiserror::Error;

use crate::domain::value_objects::Channel;

/// Sign-in and credential errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("No account matches the supplied identifier")]
    UnknownIdentifier,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Too many failed sign-in attempts, retry in {retry_after_seconds} seconds")]
    LockedOut { retry_after_seconds: u64 },

    #[error("Customer account is disabled")]
    AccountDisabled,

    #[error("reCAPTCHA verification failed")]
    CaptchaRejected,
}

/// Token errors
///
/// All variants surface to callers as "token is invalid or expired".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Malformed token")]
    Malformed,

    #[error("Token has been revoked")]
    Revoked,

    #[error("Expected a {expected} token")]
    WrongKind { expected: &'static str },

    #[error("Token generation failed")]
    GenerationFailed,
}

/// Input validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field: {field}")]
    RequiredField { field: String },

    #[error("Invalid format: {field}")]
    InvalidFormat { field: String },

    #[error("Enter a valid email address")]
    InvalidEmail,

    #[error("Enter a valid mobile number")]
    InvalidMobile,

    #[error("National code is not valid")]
    InvalidNationalCode,

    #[error("Provide exactly one of email or mobile")]
    ConflictingIdentifier,

    #[error("You must accept the terms and policy")]
    PolicyNotAccepted,

    #[error("Password is too weak: {reason}")]
    WeakPassword { reason: String },

    #[error("Password confirmation does not match")]
    PasswordMismatch,

    #[error("New password must differ from the current one")]
    SamePassword,

    #[error("Current password is incorrect")]
    IncorrectPassword,
}

impl ValidationError {
    /// Field the error should be reported against
    pub fn field(&self) -> &str {
        match self {
            ValidationError::RequiredField { field } | ValidationError::InvalidFormat { field } => {
                field
            }
            ValidationError::InvalidEmail => "email",
            ValidationError::InvalidMobile => "mobile",
            ValidationError::InvalidNationalCode => "national_code",
            ValidationError::ConflictingIdentifier => "non_field_errors",
            ValidationError::PolicyNotAccepted => "agree_with_policy",
            ValidationError::WeakPassword { .. } => "password",
            ValidationError::PasswordMismatch => "confirm_password",
            ValidationError::SamePassword => "new_password",
            ValidationError::IncorrectPassword => "old_password",
        }
    }
}

/// Email-link and mobile-OTP lifecycle errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("{channel} is already verified")]
    AlreadyVerified { channel: Channel },

    #[error("Verification ticket not found")]
    TicketNotFound,

    #[error("Verification ticket has expired")]
    TicketExpired,

    #[error("Verification code is not valid")]
    InvalidCode,

    #[error("No verification in progress, sign up first")]
    NoPendingCycle,

    #[error("Please wait {remaining_seconds} seconds before requesting another {channel} verification")]
    ResendTooSoon {
        channel: Channel,
        remaining_seconds: u64,
    },

    #[error("{channel} can be changed at most {limit} times before verification")]
    ChangeLimitExceeded { channel: Channel, limit: usize },

    #[error("Customer has no {channel} to verify")]
    MissingContact { channel: Channel },
}
