//! Session issuer implementation

use chrono::Duration;
use ident_shared::utils::clock::Clock;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Customer, SessionClaims, TokenKind, TokenPair};
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::CacheStore;

use super::config::SessionConfig;

const REVOKED_KEY_PREFIX: &str = "revoked_token";

/// Mints and validates signed session tokens
///
/// Tokens are self-contained: signature, issuer, audience and lifetime are checked
/// without a lookup. The only server-side state is the denylist of revoked token
/// ids, kept in the cache until the token would have expired anyway.
pub struct SessionIssuer<C: CacheStore> {
    cache: Arc<C>,
    config: SessionConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl<C: CacheStore> SessionIssuer<C> {
    /// Creates a new session issuer
    ///
    /// # Arguments
    ///
    /// * `cache` - Cache holding the denylist
    /// * `config` - Signing and lifetime configuration
    /// * `clock` - Time source for issuing and expiry checks
    pub fn new(cache: Arc<C>, config: SessionConfig, clock: Arc<dyn Clock>) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        // time claims are checked against the injected clock in `decode_claims`
        let mut validation = Validation::new(config.algorithm);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.validate_exp = false;
        validation.validate_nbf = false;

        Self {
            cache,
            config,
            encoding_key,
            decoding_key,
            validation,
            clock,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Issues a fresh access/refresh pair for a customer
    pub fn issue_pair(&self, customer: &Customer) -> DomainResult<TokenPair> {
        let access_token = self.mint(customer.id, TokenKind::Access)?;
        let refresh_token = self.mint(customer.id, TokenKind::Refresh)?;

        tracing::info!(
            customer_id = %customer.id,
            event = "token_pair_issued",
            "Issued session tokens"
        );

        Ok(TokenPair::new(
            access_token,
            refresh_token,
            self.config.access_token_ttl_seconds,
            self.config.refresh_token_ttl_seconds,
        ))
    }

    /// Validates an access token, including the denylist
    pub async fn validate_access(&self, token: &str) -> DomainResult<SessionClaims> {
        self.validate(token, Some(TokenKind::Access)).await
    }

    /// Validates a refresh token, including the denylist
    pub async fn validate_refresh(&self, token: &str) -> DomainResult<SessionClaims> {
        self.validate(token, Some(TokenKind::Refresh)).await
    }

    /// Validates a token of either kind
    pub async fn verify(&self, token: &str) -> DomainResult<SessionClaims> {
        self.validate(token, None).await
    }

    /// Mints a new access token from a valid refresh token
    ///
    /// The refresh token itself stays valid until it expires or is revoked.
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<String> {
        let claims = self.validate_refresh(refresh_token).await?;
        let customer_id = claims
            .customer_id()
            .ok_or(DomainError::Token(TokenError::Malformed))?;
        self.mint(customer_id, TokenKind::Access)
    }

    /// Revokes a refresh token
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Token is on the denylist until its natural expiry
    /// * `Err(TokenError)` - Token is malformed, expired, not a refresh token or already revoked
    pub async fn revoke(&self, refresh_token: &str) -> DomainResult<()> {
        let claims = self.validate_refresh(refresh_token).await?;
        let now = self.clock.now().timestamp();
        // keep at least one second so the key is actually written
        let ttl = claims.remaining_lifetime(now).max(1);

        self.cache
            .set(&Self::revoked_key(&claims.jti), &claims.sub, ttl)
            .await?;

        tracing::info!(
            customer_id = %claims.sub,
            jti = %claims.jti,
            event = "refresh_token_revoked",
            "Refresh token revoked"
        );
        Ok(())
    }

    /// Checks the denylist for a token id
    pub async fn is_revoked(&self, jti: &str) -> DomainResult<bool> {
        self.cache.exists(&Self::revoked_key(jti)).await
    }

    async fn validate(
        &self,
        token: &str,
        expected: Option<TokenKind>,
    ) -> DomainResult<SessionClaims> {
        let claims = self.decode_claims(token)?;

        if let Some(kind) = expected {
            if claims.token_kind != kind {
                return Err(TokenError::WrongKind {
                    expected: kind.as_str(),
                }
                .into());
            }
        }

        if self.is_revoked(&claims.jti).await? {
            return Err(TokenError::Revoked.into());
        }

        Ok(claims)
    }

    fn decode_claims(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, event = "token_decode_failed", "Rejected token");
                TokenError::Malformed
            })?;
        let claims = data.claims;

        let now = self.clock.now().timestamp();
        if claims.exp <= now {
            return Err(TokenError::Expired);
        }
        if claims.nbf > now {
            return Err(TokenError::Malformed);
        }
        Ok(claims)
    }

    fn mint(&self, customer_id: Uuid, kind: TokenKind) -> DomainResult<String> {
        let now = self.clock.now();
        let ttl = match kind {
            TokenKind::Access => self.config.access_token_ttl_seconds,
            TokenKind::Refresh => self.config.refresh_token_ttl_seconds,
        };
        let claims = SessionClaims {
            sub: customer_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl)).timestamp(),
            nbf: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            jti: Uuid::new_v4().to_string(),
            token_kind: kind,
        };

        encode(&Header::new(self.config.algorithm), &claims, &self.encoding_key)
            .map_err(|_| DomainError::Token(TokenError::GenerationFailed))
    }

    fn revoked_key(jti: &str) -> String {
        format!("{}:{}", REVOKED_KEY_PREFIX, jti)
    }
}
