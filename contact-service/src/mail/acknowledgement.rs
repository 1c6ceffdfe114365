//! Acknowledgement email sent back to the submitter.

use crate::form::SubmissionDraft;
use crate::mail::relay::OutgoingMail;

pub const ACK_SUBJECT: &str = "Thanks for contacting us!";

/// Compose the plain-text acknowledgement for a submission.
///
/// The message is quoted verbatim; the inquiry type is lowercased into the
/// opening sentence.
pub fn compose_acknowledgement(draft: &SubmissionDraft, from: &str, signature: &str) -> OutgoingMail {
    let body = format!(
        "Hi {name},\n\nThanks for your {inquiry}.\n\nWe received your message:\n\"{message}\"\n\nWe'll respond as soon as possible.\n\n- {signature}",
        name = draft.name,
        inquiry = draft.inquiry_type.as_str().to_lowercase(),
        message = draft.message,
        signature = signature,
    );

    OutgoingMail {
        from: from.to_string(),
        to: draft.email.clone(),
        subject: ACK_SUBJECT.to_string(),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::InquiryType;

    #[test]
    fn test_compose_acknowledgement() {
        let draft = SubmissionDraft {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: String::new(),
            subject: "Hi".to_string(),
            inquiry_type: InquiryType::Feedback,
            message: "Line one\nLine \"two\"".to_string(),
        };

        let mail = compose_acknowledgement(&draft, "service@example.com", "Acme");

        assert_eq!(mail.from, "service@example.com");
        assert_eq!(mail.to, "ada@example.com");
        assert_eq!(mail.subject, ACK_SUBJECT);
        assert_eq!(
            mail.body,
            "Hi Ada,\n\nThanks for your feedback.\n\nWe received your message:\n\"Line one\nLine \"two\"\"\n\nWe'll respond as soon as possible.\n\n- Acme"
        );
    }
}
