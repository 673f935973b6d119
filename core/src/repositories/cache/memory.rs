//! Process-local cache honoring TTLs through an injected clock

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use ident_shared::utils::clock::{Clock, SystemClock};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::r#trait::CacheStore;
use crate::errors::DomainError;

struct Entry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// In-memory `CacheStore`
///
/// Expired entries are dropped lazily on access.
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn live<'a>(
        entries: &'a mut HashMap<String, Entry>,
        key: &str,
        now: DateTime<Utc>,
    ) -> Option<&'a mut Entry> {
        if entries.get(key).is_some_and(|e| e.expires_at <= now) {
            entries.remove(key);
        }
        entries.get_mut(key)
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        Ok(Self::live(&mut entries, key, now).map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), DomainError> {
        let expires_at = self.clock.now() + Duration::seconds(ttl_seconds as i64);
        self.entries.lock().await.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        let existed = Self::live(&mut entries, key, now).is_some();
        entries.remove(key);
        Ok(existed)
    }

    async fn increment(&self, key: &str, ttl_seconds: u64) -> Result<u64, DomainError> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        if let Some(entry) = Self::live(&mut entries, key, now) {
            let current: u64 = entry.value.parse().map_err(|_| {
                DomainError::internal(format!("cache key {} does not hold a counter", key))
            })?;
            entry.value = (current + 1).to_string();
            return Ok(current + 1);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: "1".to_string(),
                expires_at: now + Duration::seconds(ttl_seconds as i64),
            },
        );
        Ok(1)
    }

    async fn ttl(&self, key: &str) -> Result<Option<u64>, DomainError> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        Ok(Self::live(&mut entries, key, now).map(|e| {
            let remaining = e.expires_at - now;
            // whole seconds, rounded up
            ((remaining.num_milliseconds() + 999) / 1000) as u64
        }))
    }
}
