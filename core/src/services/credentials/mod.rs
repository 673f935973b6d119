//! Password policy, hashing and credential verification

mod password;
mod service;

#[cfg(test)]
mod tests;

pub use password::{PasswordHasher, PasswordPolicy};
pub use service::CredentialVerifier;
