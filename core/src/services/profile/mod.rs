//! Customer profile read and update

mod service;
mod types;

#[cfg(test)]
mod tests;

pub use service::ProfileService;
pub use types::{ContactDetails, CustomerProfile, ProfileUpdate, ProfileUpdateOutcome};
