//! Error kinds of the contact endpoint and their HTTP mapping.
//!
//! Detail is logged server-side; the response body carries only a fixed,
//! non-revealing message per kind.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::form::ValidationErrorSet;
use crate::mail::MailError;
use crate::verify::VerifyError;

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("invalid submission: {0}")]
    Validation(ValidationErrorSet),

    #[error("human verification rejected: {0:?}")]
    VerificationFailed(Vec<String>),

    #[error("verification service unavailable: {0}")]
    VerificationUnavailable(#[source] VerifyError),

    #[error("acknowledgement dispatch failed: {0}")]
    MailDispatch(#[from] MailError),

    #[error("{0} timed out")]
    Timeout(&'static str),

    #[error("request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("malformed multipart body: {0}")]
    Parse(String),

    #[error("{0}")]
    Internal(String),
}

impl From<VerifyError> for ContactError {
    /// A reqwest timeout on the verification call is the same failure as the
    /// handler's own deadline expiring.
    fn from(e: VerifyError) -> Self {
        match e {
            VerifyError::Request(ref source) if source.is_timeout() => {
                ContactError::Timeout("verification service")
            }
            other => ContactError::VerificationUnavailable(other),
        }
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ContactError {
    pub fn status(&self) -> StatusCode {
        match self {
            ContactError::Validation(_) | ContactError::VerificationFailed(_) => {
                StatusCode::BAD_REQUEST
            }
            ContactError::VerificationUnavailable(_) => StatusCode::BAD_GATEWAY,
            ContactError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ContactError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ContactError::MailDispatch(_) | ContactError::Parse(_) | ContactError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message returned to the caller.
    pub fn public_message(&self) -> String {
        match self {
            ContactError::Validation(errors) => format!("Invalid submission: {}", errors),
            ContactError::VerificationFailed(_) => "Failed reCAPTCHA verification".to_string(),
            ContactError::VerificationUnavailable(_) => {
                "Verification service unavailable".to_string()
            }
            ContactError::MailDispatch(_) => "Failed to send acknowledgement email".to_string(),
            ContactError::Timeout(_) => "Upstream service timed out".to_string(),
            ContactError::PayloadTooLarge(_) => "Attachment too large".to_string(),
            ContactError::Parse(_) | ContactError::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status_code = status.as_u16(), error = %self, "contact_form_error");
        } else {
            warn!(status_code = status.as_u16(), error = %self, "contact_form_rejected");
        }

        (
            status,
            Json(ErrorResponse {
                message: self.public_message(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormField;

    #[test]
    fn test_status_mapping() {
        let mut errors = ValidationErrorSet::new();
        errors.insert(FormField::Email, "Invalid email.");

        let cases = [
            (ContactError::Validation(errors), 400, "Invalid submission: email"),
            (
                ContactError::VerificationFailed(vec![]),
                400,
                "Failed reCAPTCHA verification",
            ),
            (
                ContactError::VerificationUnavailable(VerifyError::Status(503)),
                502,
                "Verification service unavailable",
            ),
            (ContactError::Timeout("mail relay"), 504, "Upstream service timed out"),
            (
                ContactError::Parse("boundary".to_string()),
                500,
                "Internal server error",
            ),
        ];

        for (error, status, message) in cases {
            assert_eq!(error.status().as_u16(), status);
            assert_eq!(error.public_message(), message);
        }
    }

    #[test]
    fn test_non_timeout_verify_errors_are_bad_gateway() {
        let error = ContactError::from(VerifyError::MalformedVerdict("[]".to_string()));
        assert!(matches!(error, ContactError::VerificationUnavailable(_)));
        assert_eq!(error.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_public_message_hides_detail() {
        let error = ContactError::Internal("db password is hunter2".to_string());
        assert_eq!(error.public_message(), "Internal server error");
    }
}
