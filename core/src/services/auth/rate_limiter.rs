//! Failed sign-in counter with a fixed lockout window

use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::errors::{AuthError, DomainResult};
use crate::repositories::CacheStore;

use super::config::AuthServiceConfig;

const FAILURE_KEY_PREFIX: &str = "login_failures";

/// Tracks failed sign-ins per (login identifier, source address)
///
/// The counter expires `lockout_seconds` after the first failure; later failures
/// do not extend it. Counters live in the cache and may be lost on restart.
pub struct LoginRateLimiter<C: CacheStore> {
    cache: Arc<C>,
    failure_threshold: u64,
    lockout_seconds: u64,
}

impl<C: CacheStore> LoginRateLimiter<C> {
    pub fn new(cache: Arc<C>, config: &AuthServiceConfig) -> Self {
        Self {
            cache,
            failure_threshold: u64::from(config.failure_threshold),
            lockout_seconds: config.lockout_seconds,
        }
    }

    /// Count one failed attempt, returning the failures so far in this window
    pub async fn record_failure(&self, identifier: &str, source: &str) -> DomainResult<u64> {
        let count = self
            .cache
            .increment(&Self::key(identifier, source), self.lockout_seconds)
            .await?;

        if count >= self.failure_threshold {
            tracing::warn!(
                source = %source,
                failures = count,
                event = "login_locked_out",
                "Sign-in locked after repeated failures"
            );
        }
        Ok(count)
    }

    pub async fn is_locked_out(&self, identifier: &str, source: &str) -> DomainResult<bool> {
        Ok(self.failures(identifier, source).await? >= self.failure_threshold)
    }

    /// Fail with `LockedOut` while the pair is locked
    pub async fn check(&self, identifier: &str, source: &str) -> DomainResult<()> {
        if !self.is_locked_out(identifier, source).await? {
            return Ok(());
        }
        let retry_after_seconds = self
            .cache
            .ttl(&Self::key(identifier, source))
            .await?
            .unwrap_or(self.lockout_seconds);
        Err(AuthError::LockedOut {
            retry_after_seconds,
        }
        .into())
    }

    /// Forget failures after a successful sign-in
    pub async fn clear(&self, identifier: &str, source: &str) -> DomainResult<()> {
        self.cache.delete(&Self::key(identifier, source)).await?;
        Ok(())
    }

    async fn failures(&self, identifier: &str, source: &str) -> DomainResult<u64> {
        let value = self.cache.get(&Self::key(identifier, source)).await?;
        Ok(value.and_then(|v| v.parse().ok()).unwrap_or(0))
    }

    // identifiers are hashed so raw emails and mobiles never land in the cache
    fn key(identifier: &str, source: &str) -> String {
        let digest = Sha256::digest(identifier.as_bytes());
        format!("{}:{}:{}", FAILURE_KEY_PREFIX, hex::encode(digest), source)
    }
}
