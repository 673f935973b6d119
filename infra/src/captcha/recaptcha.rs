//! Google reCAPTCHA `siteverify` client
//!
//! Fails closed: transport errors, non-2xx replies and unparsable bodies all count
//! as a rejected token.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use ident_core::services::CaptchaVerifier;
use ident_shared::RecaptchaConfig;

use crate::InfrastructureError;

/// Body returned by `siteverify`
#[derive(Debug, Clone, Deserialize)]
pub struct SiteVerifyResponse {
    pub success: bool,

    #[serde(default)]
    pub hostname: Option<String>,

    #[serde(rename = "error-codes", default)]
    pub error_codes: Vec<String>,
}

/// reCAPTCHA verifier over HTTPS
#[derive(Clone)]
pub struct RecaptchaVerifier {
    client: Client,
    secret: String,
    url: String,
}

impl RecaptchaVerifier {
    pub fn new(config: &RecaptchaConfig) -> Result<Self, InfrastructureError> {
        if config.secret.trim().is_empty() {
            return Err(InfrastructureError::Config(
                "reCAPTCHA secret is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.max(1)))
            .build()?;

        Ok(Self {
            client,
            secret: config.secret.clone(),
            url: config.url.clone(),
        })
    }

    async fn site_verify(&self, response_token: &str) -> Result<SiteVerifyResponse, reqwest::Error> {
        self.client
            .post(&self.url)
            .form(&[("secret", self.secret.as_str()), ("response", response_token)])
            .send()
            .await?
            .error_for_status()?
            .json::<SiteVerifyResponse>()
            .await
    }
}

#[async_trait]
impl CaptchaVerifier for RecaptchaVerifier {
    async fn verify(&self, response_token: &str) -> bool {
        if response_token.trim().is_empty() {
            return false;
        }

        match self.site_verify(response_token).await {
            Ok(reply) if reply.success => {
                debug!(event = "captcha_accepted", hostname = ?reply.hostname, "reCAPTCHA accepted");
                true
            }
            Ok(reply) => {
                debug!(event = "captcha_rejected", error_codes = ?reply.error_codes, "reCAPTCHA rejected");
                false
            }
            Err(e) => {
                warn!(event = "captcha_unavailable", error = %e, "reCAPTCHA verification failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> RecaptchaConfig {
        RecaptchaConfig {
            enabled: true,
            secret: "test-secret".to_string(),
            url: url.to_string(),
            timeout_seconds: 1,
        }
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        let mut config = config("https://www.google.com/recaptcha/api/siteverify");
        config.secret = "  ".to_string();
        assert!(matches!(
            RecaptchaVerifier::new(&config),
            Err(InfrastructureError::Config(_))
        ));
    }

    #[test]
    fn test_parse_siteverify_reply() {
        let reply: SiteVerifyResponse = serde_json::from_str(
            r#"{"success": false, "error-codes": ["invalid-input-response"]}"#,
        )
        .unwrap();
        assert!(!reply.success);
        assert_eq!(reply.error_codes, vec!["invalid-input-response"]);

        let reply: SiteVerifyResponse =
            serde_json::from_str(r#"{"success": true, "hostname": "example.com"}"#).unwrap();
        assert!(reply.success);
        assert!(reply.error_codes.is_empty());
    }

    #[tokio::test]
    async fn test_blank_token_is_rejected_without_a_request() {
        let verifier = RecaptchaVerifier::new(&config("http://127.0.0.1:9/siteverify")).unwrap();
        assert!(!verifier.verify("").await);
    }

    #[tokio::test]
    async fn test_unreachable_service_fails_closed() {
        let verifier = RecaptchaVerifier::new(&config("http://127.0.0.1:9/siteverify")).unwrap();
        assert!(!verifier.verify("token").await);
    }
}
