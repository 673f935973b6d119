//! Redis settings for failure counters and the token denylist

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::auth::env_or;

/// Redis connection and key namespace
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    pub url: String,

    /// Seconds allowed for each connection attempt
    pub connection_timeout: u64,

    /// Attempts made when connecting and for retriable commands
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First backoff step in milliseconds, doubled per retry
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Namespace for every key, so several deployments can share one Redis
    #[serde(default)]
    pub key_prefix: Option<String>,
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    100
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: String::from("redis://localhost:6379"),
            connection_timeout: 5,
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            key_prefix: Some(String::from("identity")),
        }
    }
}

impl CacheConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// `REDIS_URL`, `REDIS_CONNECTION_TIMEOUT` and `REDIS_KEY_PREFIX`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: std::env::var("REDIS_URL").unwrap_or_else(|_| defaults.url.clone()),
            connection_timeout: env_or("REDIS_CONNECTION_TIMEOUT", defaults.connection_timeout),
            key_prefix: std::env::var("REDIS_KEY_PREFIX").ok().or_else(|| defaults.key_prefix.clone()),
            ..defaults
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// At least one second
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout.max(1))
    }

    /// At least one attempt
    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// `prefix:key`, or `key` when no prefix is set
    pub fn make_key(&self, key: &str) -> String {
        match self.key_prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, key),
            _ => key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_namespaced() {
        let config = CacheConfig::default().with_prefix("ident");
        assert_eq!(config.make_key("revoked_token:abc"), "ident:revoked_token:abc");

        let bare = CacheConfig {
            key_prefix: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(bare.make_key("revoked_token:abc"), "revoked_token:abc");
    }

    #[test]
    fn test_zero_settings_are_floored() {
        let config = CacheConfig {
            connection_timeout: 0,
            max_retries: 0,
            ..CacheConfig::new("redis://cache:6379")
        };
        assert_eq!(config.connection_timeout(), Duration::from_secs(1));
        assert_eq!(config.attempts(), 1);
    }
}
