//! Form session: the client-held draft and the submit workflow.
//!
//! A session is shared by reference between whatever renders the form and
//! whatever triggers a submit. State lives behind a mutex that is never held
//! across an await, so the busy flag and the draft stay readable while a
//! submission is in flight.

use std::sync::{Mutex, MutexGuard};

use thiserror::Error;
use tracing::{info, warn};

use crate::client::challenge::HumanChallenge;
use crate::client::transport::SubmissionTransport;
use crate::form::{
    validate, Attachment, FieldError, FormField, SubmissionDraft, SubmissionOutcome,
    SubmissionPayload, ValidationErrorSet,
};

const SUBMIT_LABEL: &str = "Send Message";
const BUSY_LABEL: &str = "Sending...";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("a submission is already in flight")]
    AlreadySubmitting,
    #[error("invalid fields: {0}")]
    Invalid(ValidationErrorSet),
}

#[derive(Debug, Default)]
struct FormState {
    draft: SubmissionDraft,
    attachment: Option<Attachment>,
    errors: ValidationErrorSet,
    outcome: Option<SubmissionOutcome>,
    submitting: bool,
}

pub struct FormSession<C, T> {
    challenge: C,
    transport: T,
    state: Mutex<FormState>,
}

/// Clears the busy flag when the submit flow ends, however it ends.
struct BusyGuard<'a> {
    state: &'a Mutex<FormState>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.submitting = false;
    }
}

impl<C, T> FormSession<C, T>
where
    C: HumanChallenge,
    T: SubmissionTransport,
{
    /// Start a session with an empty draft.
    pub fn new(challenge: C, transport: T) -> Self {
        Self {
            challenge,
            transport,
            state: Mutex::new(FormState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_field(&self, field: FormField, value: &str) -> Result<(), FieldError> {
        self.state().draft.set_field(field, value)
    }

    pub fn set_attachment(&self, attachment: Option<Attachment>) {
        self.state().attachment = attachment;
    }

    pub fn draft(&self) -> SubmissionDraft {
        self.state().draft.clone()
    }

    pub fn attachment(&self) -> Option<Attachment> {
        self.state().attachment.clone()
    }

    pub fn errors(&self) -> ValidationErrorSet {
        self.state().errors.clone()
    }

    pub fn outcome(&self) -> Option<SubmissionOutcome> {
        self.state().outcome.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.state().submitting
    }

    /// Label of the submit control.
    pub fn submit_label(&self) -> &'static str {
        if self.is_submitting() {
            BUSY_LABEL
        } else {
            SUBMIT_LABEL
        }
    }

    /// Validate, obtain a token, and post the draft.
    ///
    /// Validation failures are returned as [`SubmitError::Invalid`] and make no
    /// network call. Transport failures are reported through the returned
    /// outcome, with the draft left untouched.
    pub async fn submit(&self) -> Result<SubmissionOutcome, SubmitError> {
        let (draft, attachment) = {
            let mut state = self.state();
            if state.submitting {
                return Err(SubmitError::AlreadySubmitting);
            }
            state.submitting = true;
            state.errors = ValidationErrorSet::new();
            state.outcome = None;
            (state.draft.clone(), state.attachment.clone())
        };
        let _busy = BusyGuard { state: &self.state };

        let errors = validate(&draft);
        if !errors.is_empty() {
            info!(invalid_fields = %errors, "contact_form_invalid");
            self.state().errors = errors.clone();
            return Err(SubmitError::Invalid(errors));
        }

        let token = match self.challenge.execute().await {
            Ok(token) => Some(token),
            Err(e) => {
                warn!(error = %e, "contact_challenge_failed");
                None
            }
        };
        self.challenge.reset();

        let payload = SubmissionPayload {
            draft,
            attachment,
            token,
        };

        let outcome = match self.transport.send(payload).await {
            Ok(()) => SubmissionOutcome::Success,
            Err(e) => SubmissionOutcome::Failure(e.to_string()),
        };

        {
            let mut state = self.state();
            if outcome.is_success() {
                state.draft = SubmissionDraft::default();
                state.attachment = None;
            }
            state.outcome = Some(outcome.clone());
        }

        info!(success = outcome.is_success(), "contact_form_submitted");
        Ok(outcome)
    }
}
