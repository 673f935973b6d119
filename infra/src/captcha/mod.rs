//! reCAPTCHA verdicts for sign-in

use async_trait::async_trait;

use ident_core::services::{CaptchaVerifier, StaticCaptchaVerifier};
use ident_shared::RecaptchaConfig;

use crate::InfrastructureError;

pub mod recaptcha;

pub use recaptcha::RecaptchaVerifier;

/// Verifier selected by configuration
///
/// Sign-in only consults the verifier when reCAPTCHA is enabled, so the disabled
/// variant is never asked for a verdict in practice.
#[derive(Clone)]
pub enum CaptchaGate {
    Recaptcha(RecaptchaVerifier),
    Disabled(StaticCaptchaVerifier),
}

impl CaptchaGate {
    pub fn from_config(config: &RecaptchaConfig) -> Result<Self, InfrastructureError> {
        if config.enabled {
            Ok(CaptchaGate::Recaptcha(RecaptchaVerifier::new(config)?))
        } else {
            Ok(CaptchaGate::Disabled(StaticCaptchaVerifier::rejecting()))
        }
    }
}

#[async_trait]
impl CaptchaVerifier for CaptchaGate {
    async fn verify(&self, response_token: &str) -> bool {
        match self {
            CaptchaGate::Recaptcha(verifier) => verifier.verify(response_token).await,
            CaptchaGate::Disabled(verifier) => verifier.verify(response_token).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_config_needs_no_secret() {
        let gate = CaptchaGate::from_config(&RecaptchaConfig::default()).unwrap();
        assert!(matches!(gate, CaptchaGate::Disabled(_)));
    }

    #[test]
    fn test_enabled_config_builds_recaptcha() {
        let config = RecaptchaConfig {
            enabled: true,
            secret: "secret".to_string(),
            ..Default::default()
        };
        let gate = CaptchaGate::from_config(&config).unwrap();
        assert!(matches!(gate, CaptchaGate::Recaptcha(_)));
    }

    #[tokio::test]
    async fn test_disabled_gate_rejects_if_asked() {
        let gate = CaptchaGate::from_config(&RecaptchaConfig::default()).unwrap();
        assert!(!gate.verify("token").await);
    }
}
