//! Session issuance: signed access/refresh pairs and the revocation denylist

mod config;
mod service;

#[cfg(test)]
mod tests;

pub use config::SessionConfig;
pub use service::SessionIssuer;
