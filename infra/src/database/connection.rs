//! Database connection pool management
//!
//! Wraps a SQLx MySQL pool configured from `DatabaseConfig`, with health checks
//! and embedded schema migrations.

use sqlx::{
    mysql::{MySqlConnectOptions, MySqlPoolOptions},
    ConnectOptions, MySqlPool, Row,
};
use std::str::FromStr;
use tracing::log::LevelFilter;

use ident_shared::DatabaseConfig;

use crate::InfrastructureError;

/// Database connection pool wrapper
#[derive(Clone)]
pub struct DatabasePool {
    pool: MySqlPool,
    config: DatabaseConfig,
}

impl DatabasePool {
    /// Create a new database connection pool
    ///
    /// # Arguments
    /// * `config` - Database configuration settings
    ///
    /// # Returns
    /// * `Result<Self, InfrastructureError>` - Database pool or error
    pub async fn new(config: DatabaseConfig) -> Result<Self, InfrastructureError> {
        tracing::info!(
            event = "database_pool_creating",
            max_connections = config.max_connections,
            "Creating database connection pool"
        );

        let connect_options = connect_options(&config)?;

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections())
            .acquire_timeout(config.acquire_timeout())
            .idle_timeout(config.idle_timeout())
            .max_lifetime(config.max_lifetime())
            .test_before_acquire(true)
            .connect_with(connect_options)
            .await
            .map_err(|e| {
                tracing::error!(event = "database_pool_failed", error = %e, "Failed to create database pool");
                InfrastructureError::Database(e)
            })?;

        tracing::info!(event = "database_pool_ready", "Database connection pool created");

        Ok(Self { pool, config })
    }

    /// Underlying SQLx pool
    pub fn get_pool(&self) -> &MySqlPool {
        &self.pool
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Run `SELECT 1` against the pool
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        let row = sqlx::query("SELECT 1").fetch_one(&self.pool).await.map_err(|e| {
            tracing::error!(event = "database_health_failed", error = %e, "Database health check failed");
            InfrastructureError::Database(e)
        })?;

        let value: i64 = row.try_get(0).unwrap_or(0);
        Ok(value == 1)
    }

    /// Current pool statistics
    pub fn get_statistics(&self) -> PoolStatistics {
        PoolStatistics {
            connections: self.pool.size(),
            idle_connections: self.pool.num_idle(),
            max_connections: self.pool.options().get_max_connections(),
        }
    }

    /// Apply the embedded migrations under `infra/migrations`
    pub async fn run_migrations(&self) -> Result<(), InfrastructureError> {
        tracing::info!(event = "database_migrating", "Running database migrations");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!(event = "database_migrated", "Database migrations completed");
        Ok(())
    }

    /// Close all connections in the pool
    pub async fn close(&self) {
        tracing::info!(event = "database_pool_closing", "Closing database connection pool");
        self.pool.close().await;
    }
}

/// Parse the URL and attach statement logging
pub(crate) fn connect_options(
    config: &DatabaseConfig,
) -> Result<MySqlConnectOptions, InfrastructureError> {
    if !config.url.starts_with("mysql://") {
        return Err(InfrastructureError::Config(format!(
            "Unsupported database URL scheme: {}",
            config.url.split("://").next().unwrap_or_default()
        )));
    }
    let options = MySqlConnectOptions::from_str(&config.url)
        .map_err(|e| InfrastructureError::Config(format!("Invalid database URL: {}", e)))?;

    Ok(options
        .log_statements(LevelFilter::Debug)
        .log_slow_statements(LevelFilter::Warn, config.slow_query_threshold()))
}

/// Connection pool statistics
#[derive(Debug, Clone)]
pub struct PoolStatistics {
    /// Total number of connections in the pool
    pub connections: u32,
    /// Number of idle connections
    pub idle_connections: usize,
    /// Maximum allowed connections
    pub max_connections: u32,
}

impl std::fmt::Display for PoolStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Pool Stats: {}/{} connections ({} idle)",
            self.connections, self.max_connections, self.idle_connections
        )
    }
}
