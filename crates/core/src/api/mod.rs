//! Client plumbing for the booking backend.
//!
//! Every backend endpoint answers with the same JSON envelope
//! (`{success, message, data}`); this module owns the HTTP client, endpoint
//! joining, bearer header and envelope parsing shared by the verification,
//! events and feedback clients.

mod client;
mod envelope;

pub use client::*;
pub use envelope::*;

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the booking backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, TLS, body read).
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request did not settle in time.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Body was not the expected JSON envelope.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// No bearer token available for an authenticated endpoint.
    #[error("No bearer token configured")]
    MissingCredential,

    /// Backend answered `success=false`.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Client not configured (bad base URL, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

impl ApiError {
    /// Transport-level failures: nothing usable came back from the server.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ApiError::HttpError(_) | ApiError::Timeout(_) | ApiError::ParseError(_)
        )
    }
}
