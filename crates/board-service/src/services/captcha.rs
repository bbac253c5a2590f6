//! Captcha verifiers
//!
//! [`HcaptchaVerifier`] asks the hCaptcha siteverify endpoint; [`DisabledCaptchaVerifier`]
//! accepts everything and is used when no secret is configured.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use board_common::CaptchaConfig;
use board_core::{CaptchaVerifier, VerificationResult};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::error::{ServiceError, ServiceResult};

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct HcaptchaVerifier {
    client: Client,
    secret: String,
    verify_url: String,
}

impl HcaptchaVerifier {
    pub fn new(secret: impl Into<String>, verify_url: impl Into<String>, timeout: Duration) -> ServiceResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::internal(format!("failed to create captcha client: {e}")))?;

        Ok(Self {
            client,
            secret: secret.into(),
            verify_url: verify_url.into(),
        })
    }

    async fn site_verify(&self, token: &str) -> Result<SiteVerifyResponse, reqwest::Error> {
        self.client
            .post(&self.verify_url)
            .form(&[("secret", self.secret.as_str()), ("response", token)])
            .send()
            .await?
            .error_for_status()?
            .json::<SiteVerifyResponse>()
            .await
    }
}

#[async_trait]
impl CaptchaVerifier for HcaptchaVerifier {
    #[instrument(skip_all)]
    async fn verify_captcha_token(&self, token: &str) -> VerificationResult {
        if token.trim().is_empty() {
            return VerificationResult::Invalid;
        }

        match self.site_verify(token).await {
            Ok(response) if response.success => VerificationResult::Valid,
            Ok(response) => {
                debug!(errors = ?response.error_codes, "Captcha rejected");
                VerificationResult::Invalid
            }
            Err(e) => {
                warn!(error = %e, "Captcha verification request failed");
                VerificationResult::Invalid
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCaptchaVerifier;

#[async_trait]
impl CaptchaVerifier for DisabledCaptchaVerifier {
    async fn verify_captcha_token(&self, _token: &str) -> VerificationResult {
        VerificationResult::Valid
    }
}

/// Pick the verifier matching the configuration
pub fn captcha_verifier_from_config(config: &CaptchaConfig) -> ServiceResult<Arc<dyn CaptchaVerifier>> {
    match config.secret.as_deref() {
        Some(secret) if config.is_enabled() => Ok(Arc::new(HcaptchaVerifier::new(
            secret,
            config.verify_url.clone(),
            Duration::from_millis(config.timeout_ms),
        )?)),
        _ => Ok(Arc::new(DisabledCaptchaVerifier)),
    }
}
