//! Contact Submit - command-line contact form.
//!
//! Fills a form session from arguments, validates it locally and posts it to
//! the contact endpoint. The challenge token must be solved out of band and
//! passed with `--token`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use contact::client::SubmitError;
use contact::{Attachment, Config, FormField, FormSession, HttpTransport, StaticChallenge};

#[derive(Debug, Parser)]
#[command(name = "contact-submit", about = "Send a message through the contact form")]
struct Args {
    #[arg(long, default_value = "")]
    name: String,

    #[arg(long, default_value = "")]
    email: String,

    #[arg(long, default_value = "")]
    phone: String,

    #[arg(long, default_value = "")]
    subject: String,

    /// Support, Feedback or Other
    #[arg(long, default_value = "Support")]
    inquiry_type: String,

    #[arg(long, default_value = "")]
    message: String,

    /// File to attach
    #[arg(long)]
    attachment: Option<PathBuf>,

    /// Solved reCAPTCHA token
    #[arg(long, env = "RECAPTCHA_TOKEN")]
    token: Option<String>,

    /// Submission endpoint (defaults to CONTACT_ENDPOINT)
    #[arg(long)]
    endpoint: Option<String>,
}

async fn read_attachment(path: &PathBuf) -> Result<Attachment> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read attachment {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());
    let content_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string();

    Ok(Attachment {
        file_name,
        content_type,
        data,
    })
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    let args = Args::parse();
    let config = Config::from_env();

    let endpoint = args
        .endpoint
        .clone()
        .unwrap_or_else(|| config.contact_endpoint.clone());
    let transport = HttpTransport::new(&endpoint, config.request_timeout())
        .context("Failed to create HTTP transport")?;
    let session = FormSession::new(StaticChallenge::new(args.token.clone()), transport);

    let inputs = [
        (FormField::Name, &args.name),
        (FormField::Email, &args.email),
        (FormField::Phone, &args.phone),
        (FormField::Subject, &args.subject),
        (FormField::InquiryType, &args.inquiry_type),
        (FormField::Message, &args.message),
    ];
    for (field, value) in inputs {
        session
            .set_field(field, value)
            .with_context(|| format!("Invalid value for {}", field))?;
    }

    if let Some(path) = &args.attachment {
        session.set_attachment(Some(read_attachment(path).await?));
    }

    match session.submit().await {
        Ok(outcome) => {
            println!("{}", outcome.banner());
            if outcome.is_success() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Err(SubmitError::Invalid(errors)) => {
            for (field, message) in errors.iter() {
                eprintln!("{}: {}", field, message);
            }
            Ok(ExitCode::from(2))
        }
        Err(e) => Err(e.into()),
    }
}
