//! Customer sign-up

mod service;
mod types;

#[cfg(test)]
mod tests;

pub use service::RegistrationService;
pub use types::{Registration, RegistrationRequest};
