use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::time::Duration;
use thiserror::Error;

use crate::models::ErrorBody;

/// Message returned to callers for every upstream failure. The detail stays in
/// the logs.
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Failed to get a response from the AI service";

/// Relay error taxonomy. Every variant renders as a flat `{ "error": ... }`
/// JSON body.
#[derive(Debug, Error)]
pub enum AppError {
    // ── Configuration errors ─────────────────────────────────────────────────
    #[error("{var} is not configured")]
    MissingCredential { var: &'static str },

    // ── Upstream errors ──────────────────────────────────────────────────────
    #[error("Upstream request to {url} failed: {source}")]
    UpstreamUnavailable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Upstream request to {url} timed out after {after:?}")]
    UpstreamTimeout { url: String, after: Duration },

    #[error("Upstream API error: {status}")]
    UpstreamStatus { status: u16, body: String },

    // ── Validation errors ────────────────────────────────────────────────────
    #[error("Invalid request body: {0}")]
    InvalidRequest(String),
}

impl AppError {
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AppError::UpstreamUnavailable { .. }
                | AppError::UpstreamTimeout { .. }
                | AppError::UpstreamStatus { .. }
        )
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text safe to show the caller.
    pub fn public_message(&self) -> String {
        if self.is_upstream() {
            UPSTREAM_FAILURE_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.public_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}
