//! Configuration module for environment variable parsing.
//!
//! Reads all configuration from environment variables. Secrets are optional at
//! parse time; the web server checks them with [`Config::require_server_secrets`]
//! before it starts accepting submissions.

use std::env;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

/// Default endpoint of the reCAPTCHA verification service.
pub const DEFAULT_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Configuration problems detected at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Public key used by the page to render the invisible widget
    pub recaptcha_site_key: Option<String>,

    /// Private key sent alongside each token to the verification service
    pub recaptcha_secret_key: Option<String>,

    /// Verification service URL
    pub recaptcha_verify_url: String,

    /// Timeout for the verification call in milliseconds
    pub verify_timeout_ms: u64,

    // =========================================================================
    // Mail Relay Configuration
    // =========================================================================

    /// SMTP account identity
    pub email_user: Option<String>,

    /// SMTP password or app token
    pub email_pass: Option<String>,

    /// From-address of acknowledgements (falls back to `email_user`)
    pub email_from: Option<String>,

    /// SMTP relay host
    pub smtp_host: String,

    /// SMTP relay port
    pub smtp_port: u16,

    /// Use STARTTLS instead of implicit TLS
    pub smtp_starttls: bool,

    /// Timeout for the mail dispatch in milliseconds
    pub mail_timeout_ms: u64,

    /// Sign-off line of the acknowledgement email
    pub ack_signature: String,

    /// Maximum accepted request body size in bytes
    pub max_upload_bytes: usize,

    // =========================================================================
    // Form Client Configuration
    // =========================================================================

    /// Submission endpoint used by the form client
    pub contact_endpoint: String,

    /// Client HTTP request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Config {
            port: parse_or(&lookup, "PORT", 8080),

            recaptcha_site_key: non_empty("RECAPTCHA_SITE_KEY"),

            recaptcha_secret_key: non_empty("RECAPTCHA_SECRET_KEY"),

            recaptcha_verify_url: non_empty("RECAPTCHA_VERIFY_URL")
                .unwrap_or_else(|| DEFAULT_VERIFY_URL.to_string()),

            verify_timeout_ms: parse_or(&lookup, "VERIFY_TIMEOUT_MS", 5000),

            email_user: non_empty("EMAIL_USER"),

            email_pass: non_empty("EMAIL_PASS"),

            email_from: non_empty("EMAIL_FROM"),

            smtp_host: non_empty("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),

            smtp_port: parse_or(&lookup, "SMTP_PORT", 465),

            smtp_starttls: parse_bool(&lookup, "SMTP_STARTTLS", false),

            mail_timeout_ms: parse_or(&lookup, "MAIL_TIMEOUT_MS", 10_000),

            ack_signature: non_empty("ACK_SIGNATURE").unwrap_or_else(|| "Your Company".to_string()),

            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024),

            contact_endpoint: non_empty("CONTACT_ENDPOINT")
                .unwrap_or_else(|| "http://localhost:8080/api/contact".to_string()),

            request_timeout_ms: parse_or(&lookup, "REQUEST_TIMEOUT_MS", 15_000),
        }
    }

    /// Check that every secret the web server depends on is present.
    pub fn require_server_secrets(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();
        if self.recaptcha_site_key.is_none() {
            missing.push("RECAPTCHA_SITE_KEY");
        }
        if self.recaptcha_secret_key.is_none() {
            missing.push("RECAPTCHA_SECRET_KEY");
        }
        if self.email_user.is_none() {
            missing.push("EMAIL_USER");
        }
        if self.email_pass.is_none() {
            missing.push("EMAIL_PASS");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Missing(missing))
        }
    }

    /// Address acknowledgements are sent from.
    pub fn sender_address(&self) -> Option<&str> {
        self.email_from.as_deref().or(self.email_user.as_deref())
    }

    pub fn verify_timeout(&self) -> Duration {
        Duration::from_millis(self.verify_timeout_ms)
    }

    pub fn mail_timeout(&self) -> Duration {
        Duration::from_millis(self.mail_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Parse a variable, warning and falling back to the default on bad input.
fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = match lookup(name) {
        Some(v) => v,
        None => return default,
    };

    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            default
        }
    }
}

/// Parse a boolean flag such as "true", "1" or "yes".
fn parse_bool<F>(lookup: &F, name: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name).map(|v| v.trim().to_ascii_lowercase()) {
        None => default,
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        Some(v) => {
            warn!(env_var = name, value = %v, "Invalid flag, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.recaptcha_verify_url, DEFAULT_VERIFY_URL);
        assert_eq!(config.smtp_host, "smtp.gmail.com");
        assert_eq!(config.smtp_port, 465);
        assert!(!config.smtp_starttls);
        assert_eq!(config.verify_timeout(), Duration::from_secs(5));
        assert_eq!(config.ack_signature, "Your Company");
    }

    #[test]
    fn test_parse_or_invalid_falls_back() {
        let config = Config::from_lookup(lookup_from(&[("PORT", "not-a-port"), ("SMTP_PORT", "587")]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.smtp_port, 587);
    }

    #[test]
    fn test_parse_bool() {
        let lookup = lookup_from(&[("A", "yes"), ("B", "0"), ("C", "maybe")]);
        assert!(parse_bool(&lookup, "A", false));
        assert!(!parse_bool(&lookup, "B", true));
        assert!(parse_bool(&lookup, "C", true));
        assert!(!parse_bool(&lookup, "MISSING", false));
    }

    #[test]
    fn test_require_server_secrets_lists_missing() {
        let config = Config::from_lookup(lookup_from(&[
            ("RECAPTCHA_SITE_KEY", "site"),
            ("EMAIL_USER", "   "),
        ]));
        let err = config.require_server_secrets().unwrap_err();
        assert_eq!(
            err,
            ConfigError::Missing(vec!["RECAPTCHA_SECRET_KEY", "EMAIL_USER", "EMAIL_PASS"])
        );
    }

    #[test]
    fn test_require_server_secrets_ok() {
        let config = Config::from_lookup(lookup_from(&[
            ("RECAPTCHA_SITE_KEY", "site"),
            ("RECAPTCHA_SECRET_KEY", "secret"),
            ("EMAIL_USER", "service@example.com"),
            ("EMAIL_PASS", "app-password"),
        ]));
        assert!(config.require_server_secrets().is_ok());
        assert_eq!(config.sender_address(), Some("service@example.com"));
    }

    #[test]
    fn test_sender_address_prefers_email_from() {
        let config = Config::from_lookup(lookup_from(&[
            ("EMAIL_USER", "service@example.com"),
            ("EMAIL_FROM", "Support <support@example.com>"),
        ]));
        assert_eq!(config.sender_address(), Some("Support <support@example.com>"));
    }
}
