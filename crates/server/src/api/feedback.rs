//! Feedback submission handler.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use ticketgate_core::{submit_feedback, FeedbackError, FeedbackForm};

use super::handlers::{error_response, ErrorResponse};
use crate::state::AppState;

/// Response for an accepted submission
#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub message: String,
}

/// Default acknowledgement when the backend sends none.
const FEEDBACK_THANKS: &str = "Thank you for helping us improve!";

/// POST /api/v1/feedback
pub async fn post_feedback(
    State(state): State<Arc<AppState>>,
    Json(form): Json<FeedbackForm>,
) -> Result<Json<FeedbackResponse>, (StatusCode, Json<ErrorResponse>)> {
    match submit_feedback(state.backend(), &form).await {
        Ok(message) => Ok(Json(FeedbackResponse {
            message: message.unwrap_or_else(|| FEEDBACK_THANKS.to_string()),
        })),
        Err(e) => {
            let status = match &e {
                FeedbackError::Incomplete | FeedbackError::InvalidEmail => StatusCode::BAD_REQUEST,
                FeedbackError::Unauthenticated => StatusCode::UNAUTHORIZED,
                FeedbackError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
                FeedbackError::Transport(_) => StatusCode::BAD_GATEWAY,
            };
            Err(error_response(status, e.to_string()))
        }
    }
}
