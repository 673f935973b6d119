//! Password hashing and policy using bcrypt

use ident_shared::config::PasswordPolicyConfig;

use crate::errors::{DomainError, ValidationError};

/// Composition rules for new passwords
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self { min_length: 8 }
    }
}

impl From<&PasswordPolicyConfig> for PasswordPolicy {
    fn from(config: &PasswordPolicyConfig) -> Self {
        Self {
            min_length: config.min_length,
        }
    }
}

impl PasswordPolicy {
    /// Validate a candidate password
    ///
    /// ## Requirements
    ///
    /// - At least `min_length` characters
    /// - At least one digit
    /// - At least one latin letter
    pub fn check(&self, password: &str) -> Result<(), ValidationError> {
        if password.chars().count() < self.min_length {
            return Err(ValidationError::WeakPassword {
                reason: format!("must be at least {} characters", self.min_length),
            });
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(ValidationError::WeakPassword {
                reason: "must contain at least one digit".into(),
            });
        }
        if !password.chars().any(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::WeakPassword {
                reason: "must contain at least one letter".into(),
            });
        }
        Ok(())
    }
}

/// bcrypt hasher with a configured work factor
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl From<&PasswordPolicyConfig> for PasswordHasher {
    fn from(config: &PasswordPolicyConfig) -> Self {
        Self::new(config.bcrypt_cost)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String, DomainError> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| DomainError::internal(format!("Password hashing failed: {}", e)))
    }

    /// Compare a password with a stored hash
    ///
    /// A malformed stored hash counts as a mismatch.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        match bcrypt::verify(password, hash) {
            Ok(matches) => matches,
            Err(e) => {
                tracing::error!(error = %e, event = "password_hash_unreadable", "Stored password hash could not be parsed");
                false
            }
        }
    }

    /// Burn roughly the same time as a real verification
    pub fn verify_dummy(&self, password: &str) {
        if let Ok(hash) = bcrypt::hash("identity-dummy-password", self.cost) {
            let _ = bcrypt::verify(password, &hash);
        }
    }
}
