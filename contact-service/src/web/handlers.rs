//! Contact endpoint handlers.
//!
//! The submission handler runs a strictly linear flow:
//! 1. Parse the multipart body
//! 2. Re-check required fields
//! 3. Verify the human-verification token
//! 4. Log the submission
//! 5. Send the acknowledgement email

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tokio::time::timeout;
use tracing::{info, warn};
use uuid::Uuid;

use crate::mail::{compose_acknowledgement, MailError, MailRelay};
use crate::verify::HumanVerifier;
use crate::web::error::{ContactError, ErrorResponse};
use crate::web::multipart::read_submission;
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub verifier: Arc<dyn HumanVerifier>,
    pub mailer: Arc<dyn MailRelay>,
}

impl AppState {
    pub fn new(
        config: Config,
        verifier: Arc<dyn HumanVerifier>,
        mailer: Arc<dyn MailRelay>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            verifier,
            mailer,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Widget Site Key
// =============================================================================

#[derive(Serialize)]
pub struct SiteKeyResponse {
    #[serde(rename = "siteKey")]
    pub site_key: String,
}

/// Public key the page needs to render the invisible challenge widget.
pub async fn site_key(State(state): State<AppState>) -> impl IntoResponse {
    match &state.config.recaptcha_site_key {
        Some(key) => (
            StatusCode::OK,
            Json(SiteKeyResponse {
                site_key: key.clone(),
            }),
        )
            .into_response(),
        None => ContactError::Internal("RECAPTCHA_SITE_KEY is not configured".to_string())
            .into_response(),
    }
}

// =============================================================================
// Contact Submission
// =============================================================================

/// Success response.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
}

/// Any method other than POST on the contact route.
pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse {
            message: "Method not allowed".to_string(),
        }),
    )
}

/// Contact form submission endpoint.
pub async fn contact(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ContactResponse>, ContactError> {
    let mut multipart = multipart.map_err(|e| ContactError::Parse(e.body_text()))?;
    let submission = read_submission(&mut multipart).await?;

    let draft = submission.draft().map_err(ContactError::Validation)?;

    let token = submission.token().map(str::trim).unwrap_or_default();
    if token.is_empty() {
        return Err(ContactError::VerificationFailed(vec![
            "missing-input-response".to_string(),
        ]));
    }

    // A reqwest timeout inside the verifier also maps to `Timeout`.
    let verdict = timeout(state.config.verify_timeout(), state.verifier.verify(token))
        .await
        .map_err(|_| ContactError::Timeout("verification service"))??;

    if !verdict.success {
        return Err(ContactError::VerificationFailed(verdict.error_codes));
    }

    let submission_id = Uuid::new_v4();
    let files: Vec<String> = submission.files.iter().map(ToString::to_string).collect();
    let file_bytes: usize = submission.files.iter().map(|f| f.size).sum();

    info!(
        submission_id = %submission_id,
        name = %draft.name,
        email = %draft.email,
        phone = %draft.phone,
        subject = %draft.subject,
        inquiry_type = %draft.inquiry_type,
        message = %draft.message,
        file_attached = submission.file_attached(),
        files = ?files,
        file_bytes = file_bytes,
        "contact_submission_received"
    );

    let from = state
        .config
        .sender_address()
        .ok_or_else(|| ContactError::Internal("sender address is not configured".to_string()))?;
    let mail = compose_acknowledgement(&draft, from, &state.config.ack_signature);

    // Validation only checks for `@`, so the relay is the first place an
    // undeliverable address such as `ada@` is caught.
    timeout(state.config.mail_timeout(), state.mailer.dispatch(&mail))
        .await
        .map_err(|_| ContactError::Timeout("mail relay"))?
        .map_err(|e| {
            if let MailError::Address { address, .. } = &e {
                warn!(
                    submission_id = %submission_id,
                    address = %address,
                    recipient_invalid = true,
                    "contact_acknowledgement_address_rejected"
                );
            }
            ContactError::MailDispatch(e)
        })?;

    info!(submission_id = %submission_id, to = %mail.to, "contact_acknowledgement_sent");

    Ok(Json(ContactResponse { success: true }))
}
