//! Multipart body parsing for contact submissions.

use std::collections::BTreeMap;
use std::fmt;

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use tracing::debug;

use crate::form::{validate, FormField, SubmissionDraft, ValidationErrorSet, TOKEN_FIELD};
use crate::web::error::ContactError;

/// A file part received with a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

impl fmt::Display for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={} ({}, {} bytes)",
            self.field, self.file_name, self.content_type, self.size
        )
    }
}

/// Parsed submission: named text parts plus uploaded files.
#[derive(Debug, Clone, Default)]
pub struct ContactSubmission {
    pub fields: BTreeMap<String, String>,
    pub files: Vec<UploadedFile>,
}

impl ContactSubmission {
    pub fn token(&self) -> Option<&str> {
        self.fields.get(TOKEN_FIELD).map(String::as_str)
    }

    pub fn file_attached(&self) -> bool {
        !self.files.is_empty()
    }

    /// Build a draft from the text parts and apply the required-field rules.
    pub fn draft(&self) -> Result<SubmissionDraft, ValidationErrorSet> {
        let mut draft = SubmissionDraft::default();
        let mut errors = ValidationErrorSet::new();

        for (name, value) in &self.fields {
            let Some(field) = FormField::from_wire(name) else {
                continue;
            };
            if let Err(e) = draft.set_field(field, value) {
                errors.insert(field, e.to_string());
            }
        }

        errors.merge(validate(&draft));
        if errors.is_empty() {
            Ok(draft)
        } else {
            Err(errors)
        }
    }
}

fn multipart_error(e: MultipartError) -> ContactError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ContactError::PayloadTooLarge(e.body_text())
    } else {
        ContactError::Parse(e.body_text())
    }
}

/// Drain a multipart body into a [`ContactSubmission`].
///
/// Parts with a file name are treated as uploads; everything else is text.
pub async fn read_submission(multipart: &mut Multipart) -> Result<ContactSubmission, ContactError> {
    let mut submission = ContactSubmission::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(file_name) = field.file_name().map(str::to_string) {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field.bytes().await.map_err(multipart_error)?;

            debug!(
                field = %name,
                file_name = %file_name,
                content_type = %content_type,
                size = data.len(),
                "contact_file_part_received"
            );

            submission.files.push(UploadedFile {
                field: name,
                file_name,
                content_type,
                size: data.len(),
            });
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            submission.fields.insert(name, value);
        }
    }

    Ok(submission)
}
