//! Configuration for the session issuer

use ident_shared::config::JwtConfig;
use jsonwebtoken::Algorithm;

use crate::errors::DomainError;

/// Configuration for the session issuer
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// JWT signing secret
    pub jwt_secret: String,
    /// JWT signing algorithm (HMAC family)
    pub algorithm: Algorithm,
    /// Access token lifetime in seconds
    pub access_token_ttl_seconds: i64,
    /// Refresh token lifetime in seconds
    pub refresh_token_ttl_seconds: i64,
    pub issuer: String,
    pub audience: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "development-secret-please-change-in-production".to_string(),
            algorithm: Algorithm::HS256,
            access_token_ttl_seconds: 2 * 60 * 60,
            refresh_token_ttl_seconds: 24 * 60 * 60,
            issuer: "customer-identity".to_string(),
            audience: "customer-identity-api".to_string(),
        }
    }
}

impl TryFrom<&JwtConfig> for SessionConfig {
    type Error = DomainError;

    fn try_from(config: &JwtConfig) -> Result<Self, Self::Error> {
        let algorithm = match config.algorithm.to_uppercase().as_str() {
            "HS256" => Algorithm::HS256,
            "HS384" => Algorithm::HS384,
            "HS512" => Algorithm::HS512,
            other => {
                return Err(DomainError::internal(format!(
                    "Unsupported JWT algorithm: {}",
                    other
                )))
            }
        };
        Ok(Self {
            jwt_secret: config.secret.clone(),
            algorithm,
            access_token_ttl_seconds: config.access_token_expiry,
            refresh_token_ttl_seconds: config.refresh_token_expiry,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        })
    }
}
