//! Outbound mail relay.
//!
//! [`SmtpRelay`] authenticates against an SMTP server with the service
//! account and sends plain-text messages through lettre's async transport.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address {address}: {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },
    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// A plain-text message ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl OutgoingMail {
    /// Build the RFC 5322 message.
    pub fn to_message(&self) -> Result<Message, MailError> {
        Ok(Message::builder()
            .from(parse_mailbox(&self.from)?)
            .to(parse_mailbox(&self.to)?)
            .subject(self.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(self.body.clone())?)
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|source| MailError::Address {
        address: address.to_string(),
        source,
    })
}

/// Sends a message through an external relay.
#[async_trait]
pub trait MailRelay: Send + Sync {
    async fn dispatch(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

/// SMTP connection settings.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub starttls: bool,
    pub username: String,
    pub password: String,
}

#[derive(Clone)]
pub struct SmtpRelay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpRelay {
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailError> {
        let builder = if settings.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)?
        };

        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        info!(
            smtp_host = %settings.host,
            smtp_port = settings.port,
            starttls = settings.starttls,
            "smtp_relay_initialized"
        );

        Ok(Self { transport })
    }
}

#[async_trait]
impl MailRelay for SmtpRelay {
    async fn dispatch(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let message = mail.to_message()?;
        let response = self.transport.send(message).await?;

        info!(
            to = %mail.to,
            smtp_code = %response.code(),
            "smtp_mail_sent"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail(to: &str) -> OutgoingMail {
        OutgoingMail {
            from: "Contact <service@example.com>".to_string(),
            to: to.to_string(),
            subject: "Thanks".to_string(),
            body: "Body".to_string(),
        }
    }

    #[test]
    fn test_to_message_formats_headers() {
        let message = mail("ada@example.com").to_message().unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("To: ada@example.com"));
        assert!(raw.contains("Subject: Thanks"));
        assert!(raw.contains("Content-Type: text/plain"));
    }

    #[test]
    fn test_to_message_rejects_bad_recipient() {
        let err = mail("ada@").to_message().unwrap_err();
        assert!(matches!(err, MailError::Address { ref address, .. } if address == "ada@"));
    }

    #[tokio::test]
    async fn test_smtp_relay_builds_without_connecting() {
        let settings = SmtpSettings {
            host: "smtp.example.com".to_string(),
            port: 587,
            starttls: true,
            username: "user".to_string(),
            password: "pass".to_string(),
        };
        assert!(SmtpRelay::new(&settings).is_ok());
    }
}
