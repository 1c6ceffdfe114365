//! Contact Service - contact form client and submission endpoint.
//!
//! This library provides shared modules for the two binaries:
//! - `contact-web`: Submission endpoint (verification, logging, acknowledgement)
//! - `contact-submit`: Command-line form client
//!
//! ## Architecture
//!
//! ```text
//! FormSession → POST /api/contact → reCAPTCHA siteverify → log → SMTP acknowledgement
//! ```

pub mod client;
pub mod config;
pub mod form;
pub mod mail;
pub mod verify;
pub mod web;

// Re-export commonly used types
pub use client::{FormSession, HttpTransport, StaticChallenge};
pub use config::Config;
pub use form::{validate, Attachment, FormField, InquiryType, SubmissionDraft, SubmissionOutcome};
pub use mail::{MailRelay, SmtpRelay};
pub use verify::{HumanVerifier, RecaptchaVerifier};
pub use web::{router, AppState};
