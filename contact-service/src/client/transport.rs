//! Transport that posts a submission to the contact endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::form::{SubmissionPayload, FILE_FIELD};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid endpoint url: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("endpoint responded with status {status}")]
    Status {
        status: u16,
        message: Option<String>,
    },
}

/// One POST of a submission payload.
#[async_trait]
pub trait SubmissionTransport: Send + Sync {
    async fn send(&self, payload: SubmissionPayload) -> Result<(), TransportError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// `multipart/form-data` transport over reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, TransportError> {
        let endpoint = Url::parse(endpoint)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

/// Encode a payload as a multipart form.
fn build_form(payload: SubmissionPayload) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for (name, value) in payload.text_parts() {
        form = form.text(name, value);
    }

    if let Some(attachment) = payload.attachment {
        let part = Part::bytes(attachment.data)
            .file_name(attachment.file_name)
            .mime_str(&attachment.content_type)?;
        form = form.part(FILE_FIELD, part);
    }

    Ok(form)
}

#[async_trait]
impl SubmissionTransport for HttpTransport {
    async fn send(&self, payload: SubmissionPayload) -> Result<(), TransportError> {
        let has_attachment = payload.attachment.is_some();
        let has_token = payload.token.is_some();
        let form = build_form(payload)?;

        tracing::info!(
            endpoint = %self.endpoint,
            has_attachment = has_attachment,
            has_token = has_token,
            "contact_submit_sending"
        );

        let response = match self.client.post(self.endpoint.clone()).multipart(form).send().await {
            Ok(resp) => resp,
            Err(e) => {
                if e.is_timeout() {
                    tracing::error!(endpoint = %self.endpoint, error = %e, "contact_submit_timeout");
                } else {
                    tracing::error!(endpoint = %self.endpoint, error = %e, "contact_submit_request_error");
                }
                return Err(e.into());
            }
        };

        let status = response.status();
        if status.is_success() {
            tracing::info!(status_code = status.as_u16(), "contact_submit_accepted");
            return Ok(());
        }

        let message = response.json::<ErrorBody>().await.ok().map(|b| b.message);
        tracing::warn!(
            status_code = status.as_u16(),
            message = ?message,
            "contact_submit_rejected"
        );

        Err(TransportError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{Attachment, SubmissionDraft, TOKEN_FIELD};
    use axum::{extract::Multipart, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    /// Echo endpoint: 200 with the received part names when a token is present,
    /// 400 otherwise.
    async fn spawn_endpoint() -> String {
        async fn echo(mut multipart: Multipart) -> (StatusCode, Json<Value>) {
            let mut parts = Vec::new();
            while let Some(field) = multipart.next_field().await.unwrap() {
                let label = match field.file_name() {
                    Some(file_name) => format!("{}:{}", field.name().unwrap_or_default(), file_name),
                    None => field.name().unwrap_or_default().to_string(),
                };
                parts.push(label);
            }
            if parts.iter().any(|p| p == TOKEN_FIELD) {
                (StatusCode::OK, Json(json!({ "success": true, "parts": parts })))
            } else {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "message": "Failed reCAPTCHA verification" })),
                )
            }
        }

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route("/api/contact", post(echo));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api/contact", addr)
    }

    #[tokio::test]
    async fn test_send_posts_multipart() {
        let endpoint = spawn_endpoint().await;
        let transport = HttpTransport::new(&endpoint, Duration::from_secs(5)).unwrap();
        let payload = SubmissionPayload {
            draft: SubmissionDraft::default(),
            attachment: Some(Attachment {
                file_name: "notes.txt".to_string(),
                content_type: "text/plain".to_string(),
                data: b"notes".to_vec(),
            }),
            token: Some("tok".to_string()),
        };

        assert!(transport.send(payload).await.is_ok());
    }

    #[tokio::test]
    async fn test_send_reports_rejection_message() {
        let endpoint = spawn_endpoint().await;
        let transport = HttpTransport::new(&endpoint, Duration::from_secs(5)).unwrap();
        let payload = SubmissionPayload {
            draft: SubmissionDraft::default(),
            attachment: None,
            token: None,
        };

        let err = transport.send(payload).await.unwrap_err();
        match err {
            TransportError::Status { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message.as_deref(), Some("Failed reCAPTCHA verification"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_new_rejects_bad_endpoint() {
        let result = HttpTransport::new("not a url", Duration::from_secs(1));
        assert!(matches!(result, Err(TransportError::Endpoint(_))));
    }

    #[test]
    fn test_build_form_rejects_bad_mime() {
        let payload = SubmissionPayload {
            draft: SubmissionDraft::default(),
            attachment: Some(Attachment {
                file_name: "a.txt".to_string(),
                content_type: "not a mime".to_string(),
                data: b"hi".to_vec(),
            }),
            token: None,
        };
        assert!(matches!(build_form(payload), Err(TransportError::Request(_))));
    }

    #[test]
    fn test_build_form_has_boundary() {
        let payload = SubmissionPayload {
            draft: SubmissionDraft::default(),
            attachment: None,
            token: Some("tok".to_string()),
        };
        let form = build_form(payload).unwrap();
        assert!(!form.boundary().is_empty());
    }
}
