//! Persistence and cache interfaces, with in-memory implementations.

pub mod cache;
pub mod identity;

pub use cache::{CacheStore, MemoryCache};
pub use identity::{
    IdentityStore, InMemoryIdentityStore, PendingChange, RegistrationBundle, VerificationCommit,
};
