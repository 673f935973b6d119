//! # Infrastructure Layer
//!
//! Production adapters for the identity core's collaborator traits.
//!
//! ## Architecture
//!
//! - **Database**: MySQL `IdentityStore` using SQLx, with migrations
//! - **Cache**: Redis `CacheStore` for failure counters and the token denylist
//! - **Captcha**: reCAPTCHA `siteverify` client
//! - **Notify**: Tokio job queue delivering verification emails and SMS
//! - **Telemetry**: tracing subscriber bootstrap
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)
//! - `redis-cache`: Enable Redis caching support (default)

#[cfg(feature = "mysql")]
pub mod database;

#[cfg(feature = "redis-cache")]
pub mod cache;

pub mod captcha;
pub mod notify;
pub mod telemetry;

#[cfg(all(feature = "mysql", feature = "redis-cache"))]
mod bootstrap;

#[cfg(all(feature = "mysql", feature = "redis-cache"))]
pub use bootstrap::Infrastructure;

/// Infrastructure-specific error types
///
/// Raised while wiring adapters at startup. Once running, adapters report failures
/// through `DomainError` like every other collaborator.
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Tracing subscriber could not be installed
    #[error("Telemetry error: {0}")]
    Telemetry(String),
}
