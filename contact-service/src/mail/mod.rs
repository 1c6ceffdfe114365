//! Acknowledgement composition and mail relay.

pub mod acknowledgement;
pub mod relay;

pub use acknowledgement::{compose_acknowledgement, ACK_SUBJECT};
pub use relay::{MailError, MailRelay, OutgoingMail, SmtpRelay, SmtpSettings};
