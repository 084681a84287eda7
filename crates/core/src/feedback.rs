//! Visitor feedback submission.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{read_envelope, ApiError, BackendClient};
use crate::metrics::BACKEND_REQUESTS;

/// Endpoint path relative to the backend base URL.
pub const ADD_FEEDBACK_PATH: &str = "feedback/add_feedback/";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Feedback errors. `Display` is the message shown to the visitor.
#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("Please complete all fields and rating!")]
    Incomplete,

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("Authentication required to submit feedback.")]
    Unauthenticated,

    /// Backend said no; carries its message.
    #[error("{0}")]
    Rejected(String),

    #[error("An error occurred. Please try again.")]
    Transport(#[source] ApiError),
}

impl From<ApiError> for FeedbackError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::MissingCredential => FeedbackError::Unauthenticated,
            ApiError::Rejected(message) => FeedbackError::Rejected(message),
            other => FeedbackError::Transport(other),
        }
    }
}

/// Feedback as typed by the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
    /// 1 to 5 stars; 0 means not rated.
    #[serde(default)]
    pub rating: u8,
}

impl FeedbackForm {
    /// Check the form before anything is sent.
    pub fn validate(&self) -> Result<(), FeedbackError> {
        let blank = [&self.name, &self.email, &self.message]
            .iter()
            .any(|field| field.trim().is_empty());
        if blank || !(1..=5).contains(&self.rating) {
            return Err(FeedbackError::Incomplete);
        }
        if !EMAIL_RE.is_match(self.email.trim()) {
            return Err(FeedbackError::InvalidEmail);
        }
        Ok(())
    }
}

/// Shown when the backend rejects without a message.
pub const FEEDBACK_REJECTED_MESSAGE: &str = "Submission failed. Please try again.";

/// Validate and submit feedback. Returns the backend's acknowledgement
/// message, if any.
pub async fn submit_feedback(
    client: &BackendClient,
    form: &FeedbackForm,
) -> Result<Option<String>, FeedbackError> {
    form.validate()?;

    let authorization = client.authorization().await?;
    let url = client.endpoint(ADD_FEEDBACK_PATH)?;
    debug!("Submitting feedback to {}", url);

    let sent = client
        .http()
        .post(url)
        .header(AUTHORIZATION, authorization)
        .json(form)
        .send()
        .await
        .map_err(ApiError::from);

    let envelope = match sent {
        Ok(response) => read_envelope::<serde_json::Value>(response).await,
        Err(e) => Err(e),
    };

    let envelope = match envelope {
        Ok(envelope) => envelope,
        Err(e) => {
            BACKEND_REQUESTS.with_label_values(&["feedback", "error"]).inc();
            warn!("Feedback submission failed: {}", e);
            return Err(FeedbackError::Transport(e));
        }
    };

    if envelope.success {
        BACKEND_REQUESTS
            .with_label_values(&["feedback", "success"])
            .inc();
        Ok(envelope.message.filter(|m| !m.is_empty()))
    } else {
        BACKEND_REQUESTS
            .with_label_values(&["feedback", "rejected"])
            .inc();
        Err(FeedbackError::Rejected(
            envelope.message_or(FEEDBACK_REJECTED_MESSAGE),
        ))
    }
}
