//! Volatile key-value cache with TTL semantics
//!
//! Backs the sign-in failure counters and the revoked-token denylist. Contents may
//! be lost on restart.

use async_trait::async_trait;

use crate::errors::DomainError;

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Store a value that expires after `ttl_seconds`
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), DomainError>;

    /// Remove a key, returning whether it existed
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.get(key).await?.is_some())
    }

    /// Atomically increment a counter
    ///
    /// A missing key starts at zero and gets `ttl_seconds`; an existing key keeps
    /// its current expiry. Returns the new value.
    async fn increment(&self, key: &str, ttl_seconds: u64) -> Result<u64, DomainError>;

    /// Seconds until the key expires, `None` if it does not exist
    async fn ttl(&self, key: &str) -> Result<Option<u64>, DomainError>;
}
