//! Human-verification of submission tokens.

pub mod recaptcha;

pub use recaptcha::{parse_verdict, HumanVerifier, RecaptchaVerifier, Verdict, VerifyError};
