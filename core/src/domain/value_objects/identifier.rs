//! Login identifier: exactly one of email or mobile

use ident_shared::utils::{is_valid_email, mask_email, mask_mobile, normalize_email, normalize_mobile};
use serde::{Deserialize, Serialize};

use super::Channel;
use crate::errors::ValidationError;

/// Normalized email or mobile used to sign up and sign in
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "channel", content = "value", rename_all = "lowercase")]
pub enum LoginIdentifier {
    Email(String),
    Mobile(String),
}

impl LoginIdentifier {
    /// Build an identifier from optional request fields
    ///
    /// Blank strings count as absent. Both or neither present fails with
    /// `ConflictingIdentifier`; otherwise the one present value is normalized and
    /// format-checked.
    pub fn from_parts(email: Option<&str>, mobile: Option<&str>) -> Result<Self, ValidationError> {
        let email = email.and_then(normalize_email);
        let mobile = mobile.map(str::trim).filter(|m| !m.is_empty());

        match (email, mobile) {
            (Some(email), None) if is_valid_email(&email) => Ok(LoginIdentifier::Email(email)),
            (Some(_), None) => Err(ValidationError::InvalidEmail),
            (None, Some(mobile)) => normalize_mobile(mobile)
                .map(LoginIdentifier::Mobile)
                .ok_or(ValidationError::InvalidMobile),
            _ => Err(ValidationError::ConflictingIdentifier),
        }
    }

    pub fn email(raw: &str) -> Result<Self, ValidationError> {
        Self::from_parts(Some(raw), None).map_err(|_| ValidationError::InvalidEmail)
    }

    pub fn mobile(raw: &str) -> Result<Self, ValidationError> {
        Self::from_parts(None, Some(raw)).map_err(|_| ValidationError::InvalidMobile)
    }

    pub fn channel(&self) -> Channel {
        match self {
            LoginIdentifier::Email(_) => Channel::Email,
            LoginIdentifier::Mobile(_) => Channel::Mobile,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            LoginIdentifier::Email(value) | LoginIdentifier::Mobile(value) => value,
        }
    }

    /// Log-safe rendering
    pub fn masked(&self) -> String {
        match self {
            LoginIdentifier::Email(email) => mask_email(email),
            LoginIdentifier::Mobile(mobile) => mask_mobile(mobile),
        }
    }
}
