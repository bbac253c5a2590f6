//! Captcha verification port

use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationResult {
    Valid,
    Invalid,
}

impl VerificationResult {
    #[inline]
    pub fn is_valid(self) -> bool {
        self == Self::Valid
    }
}

/// Verifies a client-side captcha token. Implementations never error: anything that
/// prevents a positive answer is reported as [`VerificationResult::Invalid`].
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    async fn verify_captcha_token(&self, token: &str) -> VerificationResult;
}
