//! Collaborator traits used by sign-in

use async_trait::async_trait;

/// External reCAPTCHA verdict service
///
/// Implementations must return `false` when the verdict cannot be obtained.
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    async fn verify(&self, response_token: &str) -> bool;
}

/// Verifier with a fixed verdict, for development and tests
#[derive(Debug, Clone, Copy)]
pub struct StaticCaptchaVerifier {
    verdict: bool,
}

impl StaticCaptchaVerifier {
    pub fn accepting() -> Self {
        Self { verdict: true }
    }

    pub fn rejecting() -> Self {
        Self { verdict: false }
    }
}

#[async_trait]
impl CaptchaVerifier for StaticCaptchaVerifier {
    async fn verify(&self, _response_token: &str) -> bool {
        self.verdict
    }
}
