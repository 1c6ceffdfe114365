//! Contact form model and validation.

pub mod types;
pub mod validate;

pub use types::{
    Attachment, FieldError, FormField, InquiryType, SubmissionDraft, SubmissionOutcome,
    SubmissionPayload, ValidationErrorSet, FILE_FIELD, TOKEN_FIELD,
};
pub use validate::validate;
