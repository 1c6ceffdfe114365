//! reCAPTCHA token verification.
//!
//! The verification service is called with the shared secret and the token
//! the client obtained from the widget. Its reply is shape-checked before the
//! verdict is trusted: it must be a JSON object carrying a boolean `success`.
//! Reference: https://developers.google.com/recaptcha/docs/verify

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("verification request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("verification service responded with status {0}")]
    Status(u16),
    #[error("malformed verification verdict: {0}")]
    MalformedVerdict(String),
}

/// Verdict returned by the verification service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub success: bool,
    pub error_codes: Vec<String>,
}

impl Verdict {
    pub fn passed() -> Self {
        Self {
            success: true,
            error_codes: Vec::new(),
        }
    }
}

/// Decides whether a token was produced by a human.
#[async_trait]
pub trait HumanVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Verdict, VerifyError>;
}

/// Validate the shape of a verification reply and extract the verdict.
pub fn parse_verdict(body: &Value) -> Result<Verdict, VerifyError> {
    let object = body
        .as_object()
        .ok_or_else(|| VerifyError::MalformedVerdict("expected a JSON object".to_string()))?;

    let success = object
        .get("success")
        .and_then(Value::as_bool)
        .ok_or_else(|| VerifyError::MalformedVerdict("missing boolean `success`".to_string()))?;

    let error_codes = object
        .get("error-codes")
        .and_then(Value::as_array)
        .map(|codes| {
            codes
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(Verdict {
        success,
        error_codes,
    })
}

/// Verifier backed by the reCAPTCHA `siteverify` API.
#[derive(Debug, Clone)]
pub struct RecaptchaVerifier {
    client: Client,
    secret: String,
    verify_url: String,
}

impl RecaptchaVerifier {
    pub fn new(client: Client, secret: String, verify_url: String) -> Self {
        Self {
            client,
            secret,
            verify_url,
        }
    }
}

#[async_trait]
impl HumanVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str) -> Result<Verdict, VerifyError> {
        let response = self
            .client
            .post(&self.verify_url)
            .form(&[("secret", self.secret.as_str()), ("response", token)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status_code = status.as_u16(), "recaptcha_verify_bad_status");
            return Err(VerifyError::Status(status.as_u16()));
        }

        let body: Value = response.json().await?;
        let verdict = parse_verdict(&body)?;

        info!(
            success = verdict.success,
            error_codes = ?verdict.error_codes,
            "recaptcha_verify_complete"
        );

        Ok(verdict)
    }
}
