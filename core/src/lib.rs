//! # Identity Core
//!
//! Domain layer of the customer identity service: registration, email and
//! mobile verification, sign-in lockout, session tokens and profile changes.
//! Storage, cache, captcha and message delivery are reached through traits so
//! the workflows run the same against MySQL/Redis or the in-memory stores.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

#[cfg(test)]
mod test_support;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
