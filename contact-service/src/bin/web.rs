//! Contact Web Server - contact form submission endpoint.
//!
//! This binary:
//! - Accepts multipart submissions on `POST /api/contact`
//! - Verifies the reCAPTCHA token
//! - Logs the submission
//! - Emails an acknowledgement to the submitter

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use contact::mail::SmtpSettings;
use contact::{router, AppState, Config, RecaptchaVerifier, SmtpRelay};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("web_server_starting");

    // Load configuration
    let config = Config::from_env();
    config
        .require_server_secrets()
        .context("Server is misconfigured")?;
    info!(
        port = config.port,
        verify_url = %config.recaptcha_verify_url,
        smtp_host = %config.smtp_host,
        smtp_port = config.smtp_port,
        max_upload_bytes = config.max_upload_bytes,
        "config_loaded"
    );

    let http = reqwest::Client::builder()
        .timeout(config.verify_timeout())
        .build()
        .context("Failed to build HTTP client")?;
    let verifier = RecaptchaVerifier::new(
        http,
        config.recaptcha_secret_key.clone().unwrap_or_default(),
        config.recaptcha_verify_url.clone(),
    );

    let mailer = SmtpRelay::new(&SmtpSettings {
        host: config.smtp_host.clone(),
        port: config.smtp_port,
        starttls: config.smtp_starttls,
        username: config.email_user.clone().unwrap_or_default(),
        password: config.email_pass.clone().unwrap_or_default(),
    })
    .context("Failed to create SMTP relay")?;

    let port = config.port;
    let state = AppState::new(config, Arc::new(verifier), Arc::new(mailer));
    let app = router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("web_server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "ctrl_c_handler_failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "sigterm_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("web_server_shutting_down");
}
