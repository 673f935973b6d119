//! Database module - MySQL implementations using SQLx
//!
//! - Connection pool management and embedded migrations
//! - `IdentityStore` implementation

pub mod connection;
pub mod mysql;

#[cfg(test)]
mod tests;

pub use connection::{DatabasePool, PoolStatistics};
pub use mysql::MySqlIdentityStore;
