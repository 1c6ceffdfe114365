//! Required-field checks applied by the client before sending and again by
//! the endpoint on receipt.

use super::types::{FormField, SubmissionDraft, ValidationErrorSet};

/// Validate a draft. An empty set means the draft can be submitted.
pub fn validate(draft: &SubmissionDraft) -> ValidationErrorSet {
    let mut errors = ValidationErrorSet::new();

    if draft.name.is_empty() {
        errors.insert(FormField::Name, "Name is required.");
    }
    if !draft.email.contains('@') {
        errors.insert(FormField::Email, "Invalid email.");
    }
    if draft.subject.is_empty() {
        errors.insert(FormField::Subject, "Subject is required.");
    }
    if draft.message.is_empty() {
        errors.insert(FormField::Message, "Message is required.");
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> SubmissionDraft {
        SubmissionDraft {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: String::new(),
            subject: "Hello".to_string(),
            inquiry_type: Default::default(),
            message: "Question about pricing".to_string(),
        }
    }

    #[test]
    fn test_valid_draft_has_no_errors() {
        assert!(validate(&valid_draft()).is_empty());
    }

    #[test]
    fn test_empty_draft_flags_required_fields() {
        let errors = validate(&SubmissionDraft::default());
        assert_eq!(
            errors.fields(),
            vec![FormField::Name, FormField::Email, FormField::Subject, FormField::Message]
        );
        assert_eq!(errors.get(FormField::Email), Some("Invalid email."));
    }

    #[test]
    fn test_each_offending_field_named_exactly() {
        let cases: [(fn(&mut SubmissionDraft), FormField); 4] = [
            (|d| d.name.clear(), FormField::Name),
            (|d| d.email = "ada.example.com".to_string(), FormField::Email),
            (|d| d.subject.clear(), FormField::Subject),
            (|d| d.message.clear(), FormField::Message),
        ];

        for (mutate, field) in cases {
            let mut draft = valid_draft();
            mutate(&mut draft);
            assert_eq!(validate(&draft).fields(), vec![field]);
        }
    }

    #[test]
    fn test_phone_is_unconstrained() {
        let mut draft = valid_draft();
        draft.phone = "not a number".to_string();
        assert!(validate(&draft).is_empty());
    }
}
