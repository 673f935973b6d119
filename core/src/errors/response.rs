//! Conversion of domain errors into the shared `ErrorResponse`

use ident_shared::errors::{error_codes, ErrorResponse, IntoErrorResponse};

use super::{AuthError, DomainError, ErrorKind};

const GENERIC_TOKEN_MESSAGE: &str = "token is invalid or expired";
const GENERIC_CREDENTIALS_MESSAGE: &str = "No active account found with the given credentials";
const GENERIC_INTERNAL_MESSAGE: &str = "An internal error occurred";

impl From<&DomainError> for ErrorResponse {
    fn from(err: &DomainError) -> Self {
        match err {
            // Unknown identifier and wrong password are indistinguishable to the caller
            DomainError::Auth(AuthError::UnknownIdentifier | AuthError::InvalidCredentials) => {
                ErrorResponse::new(error_codes::INVALID_CREDENTIALS, GENERIC_CREDENTIALS_MESSAGE)
            }
            DomainError::Token(_) => {
                ErrorResponse::new(error_codes::INVALID_TOKEN, GENERIC_TOKEN_MESSAGE)
            }
            DomainError::Internal { .. } => {
                ErrorResponse::new(error_codes::INTERNAL_ERROR, GENERIC_INTERNAL_MESSAGE)
            }
            DomainError::DuplicateIdentifier { field } => {
                ErrorResponse::new(error_codes::CONFLICT, err.to_string())
                    .with_field_error(field.clone(), format!("This {} is already registered", field))
            }
            DomainError::ValidationErr(validation) => {
                ErrorResponse::new(error_codes::VALIDATION_ERROR, err.to_string())
                    .with_field_error(validation.field(), validation.to_string())
            }
            _ => {
                let code = match err.kind() {
                    ErrorKind::Validation => error_codes::VALIDATION_ERROR,
                    ErrorKind::Conflict => error_codes::CONFLICT,
                    ErrorKind::NotFound => error_codes::NOT_FOUND,
                    ErrorKind::Expired => error_codes::EXPIRED,
                    ErrorKind::RateLimited => error_codes::RATE_LIMITED,
                    ErrorKind::Unauthorized => error_codes::UNAUTHORIZED,
                    ErrorKind::Token => error_codes::INVALID_TOKEN,
                    ErrorKind::Internal => error_codes::INTERNAL_ERROR,
                };
                let response = ErrorResponse::new(code, err.to_string());
                match err.retry_after_seconds() {
                    Some(seconds) => response.add_detail("retry_after_seconds", seconds),
                    None => response,
                }
            }
        }
    }
}

impl From<DomainError> for ErrorResponse {
    fn from(err: DomainError) -> Self {
        ErrorResponse::from(&err)
    }
}

impl IntoErrorResponse for DomainError {
    fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse::from(self)
    }
}
