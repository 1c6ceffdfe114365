//! Web server module for the contact endpoint.
//!
//! Routes:
//! - `POST /api/contact`: multipart submission (any other method gets 405)
//! - `GET /api/recaptcha/site-key`: public widget key
//! - `GET /health`: liveness probe

pub mod error;
pub mod handlers;
pub mod multipart;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use error::{ContactError, ErrorResponse};
pub use handlers::{
    contact, health, method_not_allowed, site_key, AppState, ContactResponse, HealthResponse,
    SiteKeyResponse,
};
pub use multipart::{read_submission, ContactSubmission, UploadedFile};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health))
        .route("/api/recaptcha/site-key", get(site_key))
        .route(
            "/api/contact",
            post(contact)
                .fallback(method_not_allowed)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
