//! Domain-specific error types and error handling.

mod response;
mod types;

#[cfg(test)]
mod tests;

pub use types::{AuthError, TokenError, ValidationError, VerificationError};

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// A unique contact or owner field is already taken
    #[error("Duplicate value for field: {field}")]
    DuplicateIdentifier { field: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    ValidationErr(#[from] ValidationError),

    #[error(transparent)]
    Verification(#[from] VerificationError),
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Coarse classification used by callers to pick a response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Expired,
    RateLimited,
    Unauthorized,
    Token,
    Internal,
}

impl DomainError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        DomainError::NotFound {
            resource: resource.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        DomainError::Internal {
            message: message.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>) -> Self {
        DomainError::DuplicateIdentifier {
            field: field.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::NotFound { .. } => ErrorKind::NotFound,
            DomainError::DuplicateIdentifier { .. } => ErrorKind::Conflict,
            DomainError::Internal { .. } => ErrorKind::Internal,
            DomainError::Auth(err) => match err {
                AuthError::UnknownIdentifier => ErrorKind::NotFound,
                AuthError::LockedOut { .. } => ErrorKind::RateLimited,
                AuthError::CaptchaRejected => ErrorKind::Validation,
                AuthError::InvalidCredentials | AuthError::AccountDisabled => {
                    ErrorKind::Unauthorized
                }
            },
            DomainError::Token(_) => ErrorKind::Token,
            DomainError::ValidationErr(_) => ErrorKind::Validation,
            DomainError::Verification(err) => match err {
                VerificationError::TicketNotFound | VerificationError::NoPendingCycle => {
                    ErrorKind::NotFound
                }
                VerificationError::TicketExpired => ErrorKind::Expired,
                VerificationError::ResendTooSoon { .. } => ErrorKind::RateLimited,
                VerificationError::AlreadyVerified { .. }
                | VerificationError::InvalidCode
                | VerificationError::ChangeLimitExceeded { .. }
                | VerificationError::MissingContact { .. } => ErrorKind::Validation,
            },
        }
    }

    /// Seconds the caller should wait before retrying, when the error carries one
    pub fn retry_after_seconds(&self) -> Option<u64> {
        match self {
            DomainError::Auth(AuthError::LockedOut {
                retry_after_seconds,
            }) => Some(*retry_after_seconds),
            DomainError::Verification(VerificationError::ResendTooSoon {
                remaining_seconds,
                ..
            }) => Some(*remaining_seconds),
            _ => None,
        }
    }
}
