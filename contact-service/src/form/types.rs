//! Contact form data types shared by the client and the submission endpoint.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Multipart part name carrying the human-verification token.
pub const TOKEN_FIELD: &str = "g-recaptcha-response";

/// Multipart part name carrying the optional attachment.
pub const FILE_FIELD: &str = "file";

// =============================================================================
// Fields
// =============================================================================

/// A named input of the contact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Name,
    Email,
    Phone,
    Subject,
    InquiryType,
    Message,
}

impl FormField {
    /// Every field in display order.
    pub const ALL: [FormField; 6] = [
        FormField::Name,
        FormField::Email,
        FormField::Phone,
        FormField::Subject,
        FormField::InquiryType,
        FormField::Message,
    ];

    /// Name of the field on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Email => "email",
            FormField::Phone => "phone",
            FormField::Subject => "subject",
            FormField::InquiryType => "inquiryType",
            FormField::Message => "message",
        }
    }

    /// Look a field up by its wire name.
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.wire_name() == name)
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Error raised when a field value cannot be accepted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("unknown inquiry type: {0}")]
    UnknownInquiryType(String),
}

// =============================================================================
// Inquiry Type
// =============================================================================

/// Category the submitter picked for their message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InquiryType {
    #[default]
    Support,
    Feedback,
    Other,
}

impl InquiryType {
    pub fn as_str(self) -> &'static str {
        match self {
            InquiryType::Support => "Support",
            InquiryType::Feedback => "Feedback",
            InquiryType::Other => "Other",
        }
    }
}

impl fmt::Display for InquiryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InquiryType {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Support" => Ok(InquiryType::Support),
            "Feedback" => Ok(InquiryType::Feedback),
            "Other" => Ok(InquiryType::Other),
            other => Err(FieldError::UnknownInquiryType(other.to_string())),
        }
    }
}

// =============================================================================
// Draft
// =============================================================================

/// Form contents for one form session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub inquiry_type: InquiryType,
    pub message: String,
}

impl SubmissionDraft {
    /// Update a single field from user input.
    pub fn set_field(&mut self, field: FormField, value: &str) -> Result<(), FieldError> {
        match field {
            FormField::Name => self.name = value.to_string(),
            FormField::Email => self.email = value.to_string(),
            FormField::Phone => self.phone = value.to_string(),
            FormField::Subject => self.subject = value.to_string(),
            FormField::InquiryType => self.inquiry_type = value.parse()?,
            FormField::Message => self.message = value.to_string(),
        }
        Ok(())
    }

    /// Current value of a field as text.
    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Phone => &self.phone,
            FormField::Subject => &self.subject,
            FormField::InquiryType => self.inquiry_type.as_str(),
            FormField::Message => &self.message,
        }
    }

    /// Every field as `(wire name, value)` pairs.
    pub fn text_parts(&self) -> Vec<(&'static str, String)> {
        FormField::ALL
            .iter()
            .map(|f| (f.wire_name(), self.field(*f).to_string()))
            .collect()
    }
}

/// A file chosen by the submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Multipart-ready submission: draft, attachment and verification token.
#[derive(Debug, Clone)]
pub struct SubmissionPayload {
    pub draft: SubmissionDraft,
    pub attachment: Option<Attachment>,
    pub token: Option<String>,
}

impl SubmissionPayload {
    /// Text parts in send order, token last when present.
    pub fn text_parts(&self) -> Vec<(&'static str, String)> {
        let mut parts = self.draft.text_parts();
        if let Some(token) = self.token.as_ref().filter(|t| !t.is_empty()) {
            parts.push((TOKEN_FIELD, token.clone()));
        }
        parts
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Field name to error message, ordered by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrorSet {
    errors: BTreeMap<FormField, String>,
}

impl ValidationErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: FormField, message: impl Into<String>) {
        self.errors.insert(field, message.into());
    }

    /// Fold another set in; existing messages for a field are kept.
    pub fn merge(&mut self, other: ValidationErrorSet) {
        for (field, message) in other.errors {
            self.errors.entry(field).or_insert(message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: FormField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn fields(&self) -> Vec<FormField> {
        self.errors.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FormField, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

impl fmt::Display for ValidationErrorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.errors.keys().map(|field| field.wire_name()).collect();
        f.write_str(&names.join(", "))
    }
}

// =============================================================================
// Outcome
// =============================================================================

/// Result of one submission attempt, as shown to the submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Success,
    Failure(String),
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Success)
    }

    /// Banner text for the outcome.
    pub fn banner(&self) -> &'static str {
        match self {
            SubmissionOutcome::Success => "Thank you for your message! 🎉",
            SubmissionOutcome::Failure(_) => "Something went wrong. Try again later.",
        }
    }

    /// Whether the celebratory flourish accompanies the banner.
    pub fn celebrates(&self) -> bool {
        self.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_defaults() {
        let draft = SubmissionDraft::default();
        assert!(draft.name.is_empty());
        assert_eq!(draft.inquiry_type, InquiryType::Support);
    }

    #[test]
    fn test_set_field_by_wire_name() {
        let mut draft = SubmissionDraft::default();
        let field = FormField::from_wire("inquiryType").unwrap();
        draft.set_field(field, "Feedback").unwrap();
        assert_eq!(draft.inquiry_type, InquiryType::Feedback);

        let err = draft.set_field(field, "Complaint").unwrap_err();
        assert_eq!(err, FieldError::UnknownInquiryType("Complaint".to_string()));
        assert_eq!(draft.inquiry_type, InquiryType::Feedback);
    }

    #[test]
    fn test_from_wire_unknown() {
        assert_eq!(FormField::from_wire("g-recaptcha-response"), None);
        assert_eq!(FormField::from_wire("email"), Some(FormField::Email));
    }

    #[test]
    fn test_payload_text_parts_includes_token() {
        let payload = SubmissionPayload {
            draft: SubmissionDraft::default(),
            attachment: None,
            token: Some("tok".to_string()),
        };
        let parts = payload.text_parts();
        assert_eq!(parts.len(), 7);
        assert_eq!(parts[4], ("inquiryType", "Support".to_string()));
        assert_eq!(parts.last().unwrap(), &(TOKEN_FIELD, "tok".to_string()));
    }

    #[test]
    fn test_payload_text_parts_skips_empty_token() {
        let payload = SubmissionPayload {
            draft: SubmissionDraft::default(),
            attachment: None,
            token: Some(String::new()),
        };
        assert!(payload.text_parts().iter().all(|(k, _)| *k != TOKEN_FIELD));
    }

    #[test]
    fn test_error_set_display_and_merge() {
        let mut errors = ValidationErrorSet::new();
        errors.insert(FormField::Message, "Message is required.");
        let mut other = ValidationErrorSet::new();
        other.insert(FormField::Name, "Name is required.");
        other.insert(FormField::Message, "ignored");
        errors.merge(other);

        assert_eq!(errors.to_string(), "name, message");
        assert_eq!(errors.get(FormField::Message), Some("Message is required."));
    }

    #[test]
    fn test_outcome_banner() {
        assert!(SubmissionOutcome::Success.celebrates());
        let failure = SubmissionOutcome::Failure("status 500".to_string());
        assert!(!failure.celebrates());
        assert_eq!(failure.banner(), "Something went wrong. Try again later.");
    }
}
