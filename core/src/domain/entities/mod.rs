//! Domain entities representing identity records.

pub mod change_request;
pub mod contact;
pub mod customer;
pub mod owner;
pub mod ticket;
pub mod token;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use change_request::ChangeRequest;
pub use contact::Contact;
pub use customer::Customer;
pub use owner::{Company, Owner, OwnerKind, OwnerRef, Person};
pub use ticket::VerificationTicket;
pub use token::{SessionClaims, TokenKind, TokenPair};
