//! Redis-backed `CacheStore`
//!
//! Holds the sign-in failure counters and the revoked refresh-token denylist.
//! A single multiplexed connection is shared by all clones; transient errors are
//! retried with exponential backoff.

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, Client, RedisError, RedisResult};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use ident_core::errors::DomainError;
use ident_core::repositories::CacheStore;
use ident_shared::CacheConfig;

use crate::InfrastructureError;

const MAX_BACKOFF_MS: u64 = 5000;

type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// Redis cache with key prefixing and retry logic
#[derive(Clone)]
pub struct RedisCache {
    connection: MultiplexedConnection,
    config: CacheConfig,
}

impl RedisCache {
    /// Connect using `config.max_retries` attempts with exponential backoff
    ///
    /// # Returns
    /// * `Ok(RedisCache)` - Connected cache
    /// * `Err(InfrastructureError::Config)` - The URL could not be parsed
    /// * `Err(InfrastructureError::Cache)` - Every connection attempt failed
    pub async fn connect(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!(
            event = "redis_connecting",
            url = %mask_url(&config.url),
            "Connecting to Redis"
        );

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!(event = "redis_url_invalid", error = %e, "Failed to parse Redis URL");
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection = Self::connect_with_retry(&client, &config).await?;
        info!(event = "redis_connected", "Redis cache ready");

        Ok(Self { connection, config })
    }

    async fn connect_with_retry(
        client: &Client,
        config: &CacheConfig,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let max_attempts = config.attempts();
        let timeout = config.connection_timeout();
        let mut attempts = 0;
        let mut delay = config.retry_delay_ms;

        loop {
            attempts += 1;
            let result = tokio::time::timeout(timeout, client.get_multiplexed_async_connection())
                .await
                .unwrap_or_else(|_| {
                    Err(RedisError::from((
                        redis::ErrorKind::IoError,
                        "connection timed out",
                    )))
                });

            match result {
                Ok(connection) => return Ok(connection),
                Err(e) if attempts < max_attempts => {
                    warn!(
                        event = "redis_connect_retry",
                        attempt = attempts,
                        max_attempts,
                        delay_ms = delay,
                        error = %e,
                        "Failed to connect to Redis, retrying"
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = next_backoff(delay);
                }
                Err(e) => {
                    error!(
                        event = "redis_connect_failed",
                        attempts,
                        error = %e,
                        "Giving up connecting to Redis"
                    );
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    /// PING the server
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let response = self
            .execute_with_retry(|mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await?;
        Ok(response == "PONG")
    }

    fn key(&self, key: &str) -> String {
        self.config.make_key(key)
    }

    async fn execute_with_retry<F, T>(&self, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        let max_attempts = self.config.attempts();
        let mut attempts = 0;
        let mut delay = self.config.retry_delay_ms;

        loop {
            attempts += 1;
            match operation(self.connection.clone()).await {
                Ok(result) => return Ok(result),
                Err(e) if attempts < max_attempts && is_retriable_error(&e) => {
                    warn!(
                        event = "redis_retry",
                        attempt = attempts,
                        delay_ms = delay,
                        error = %e,
                        "Redis operation failed, retrying"
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = next_backoff(delay);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn cache_error(operation: &'static str) -> impl Fn(RedisError) -> DomainError {
    move |e| {
        error!(event = "redis_operation_failed", operation, error = %e, "Redis operation failed");
        DomainError::internal(format!("cache {} failed: {}", operation, e))
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let key = self.key(key);
        self.execute_with_retry(|mut conn| {
            let key = key.clone();
            Box::pin(async move {
                redis::cmd("GET")
                    .arg(key)
                    .query_async::<_, Option<String>>(&mut conn)
                    .await
            })
        })
        .await
        .map_err(cache_error("get"))
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), DomainError> {
        let key = self.key(key);
        let value = value.to_string();
        // redis rejects EX 0
        let ttl = ttl_seconds.max(1);
        debug!(key = %key, ttl, "Setting cache key");
        self.execute_with_retry(|mut conn| {
            let key = key.clone();
            let value = value.clone();
            Box::pin(async move {
                redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("EX")
                    .arg(ttl)
                    .query_async::<_, ()>(&mut conn)
                    .await
            })
        })
        .await
        .map_err(cache_error("set"))
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let key = self.key(key);
        let deleted = self
            .execute_with_retry(|mut conn| {
                let key = key.clone();
                Box::pin(async move { redis::cmd("DEL").arg(key).query_async::<_, u32>(&mut conn).await })
            })
            .await
            .map_err(cache_error("delete"))?;
        Ok(deleted > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        let key = self.key(key);
        self.execute_with_retry(|mut conn| {
            let key = key.clone();
            Box::pin(async move {
                redis::cmd("EXISTS")
                    .arg(key)
                    .query_async::<_, bool>(&mut conn)
                    .await
            })
        })
        .await
        .map_err(cache_error("exists"))
    }

    async fn increment(&self, key: &str, ttl_seconds: u64) -> Result<u64, DomainError> {
        let key = self.key(key);
        let ttl = ttl_seconds.max(1);
        // SET NX seeds the counter and its expiry only when the key is absent,
        // so later increments keep the window opened by the first one
        let (count,): (u64,) = self
            .execute_with_retry(|mut conn| {
                let key = key.clone();
                Box::pin(async move {
                    redis::pipe()
                        .atomic()
                        .cmd("SET")
                        .arg(&key)
                        .arg(0)
                        .arg("NX")
                        .arg("EX")
                        .arg(ttl)
                        .ignore()
                        .cmd("INCR")
                        .arg(&key)
                        .query_async(&mut conn)
                        .await
                })
            })
            .await
            .map_err(cache_error("increment"))?;
        Ok(count)
    }

    async fn ttl(&self, key: &str) -> Result<Option<u64>, DomainError> {
        let key = self.key(key);
        let ttl = self
            .execute_with_retry(|mut conn| {
                let key = key.clone();
                Box::pin(async move { redis::cmd("TTL").arg(key).query_async::<_, i64>(&mut conn).await })
            })
            .await
            .map_err(cache_error("ttl"))?;
        Ok(ttl_from_reply(ttl))
    }
}

/// Interpret a `TTL` reply: `-2` missing key, `-1` no expiry
pub(crate) fn ttl_from_reply(reply: i64) -> Option<u64> {
    u64::try_from(reply).ok()
}

pub(crate) fn next_backoff(delay_ms: u64) -> u64 {
    delay_ms.saturating_mul(2).min(MAX_BACKOFF_MS)
}

pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError | redis::ErrorKind::BusyLoadingError | redis::ErrorKind::TryAgain
    )
}

/// Hide credentials in a Redis URL
pub(crate) fn mask_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(proto_end), Some(at)) if at > proto_end => {
            format!("{}****{}", &url[..proto_end + 3], &url[at..])
        }
        _ => url.to_string(),
    }
}
