//! Verification API handlers.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use ticketgate_core::{
    FailureKind, PresenterState, TicketRecord, UploadedImage, VerificationOutcome,
};

use super::handlers::{error_response, ErrorResponse};
use crate::state::AppState;

/// Multipart field carrying the QR image.
const IMAGE_FIELD: &str = "image";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for verifying a decoded identifier
#[derive(Debug, Deserialize)]
pub struct VerifyBody {
    pub ticket_id: String,
}

/// Outcome of one verification cycle
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VerifyResponse {
    Success { ticket: TicketRecord },
    Failure { kind: FailureKind, message: String },
    Pending,
}

impl From<VerificationOutcome> for VerifyResponse {
    fn from(outcome: VerificationOutcome) -> Self {
        match outcome {
            VerificationOutcome::Success(ticket) => VerifyResponse::Success { ticket },
            VerificationOutcome::Failure(failure) => VerifyResponse::Failure {
                kind: failure.kind,
                message: failure.message,
            },
            VerificationOutcome::Pending => VerifyResponse::Pending,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/verify/state
///
/// What the verification screen currently shows.
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<PresenterState> {
    Json(state.station().state().await)
}

/// POST /api/v1/verify
///
/// Verify an identifier decoded by an external scanner.
pub async fn verify(
    State(state): State<Arc<AppState>>,
    Json(body): Json<VerifyBody>,
) -> Result<Json<VerifyResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.station().submit(&body.ticket_id).await {
        Some(outcome) => Ok(Json(outcome.into())),
        None => Err(error_response(
            StatusCode::BAD_REQUEST,
            "ticket_id must not be empty",
        )),
    }
}

/// POST /api/v1/verify/upload
///
/// Verify the QR code in an uploaded image (multipart field `image`).
pub async fn verify_upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<VerifyResponse>, (StatusCode, Json<ErrorResponse>)> {
    let mut upload: Option<UploadedImage> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| {
            error_response(
                StatusCode::BAD_REQUEST,
                format!("Failed to read image: {}", e),
            )
        })?;

        debug!(
            "Received upload {:?} ({} bytes, {:?})",
            file_name,
            bytes.len(),
            content_type
        );

        upload = Some(UploadedImage {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    let Some(upload) = upload else {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("Missing multipart field '{}'", IMAGE_FIELD),
        ));
    };

    match state.station().submit_upload(upload).await {
        Some(outcome) => Ok(Json(outcome.into())),
        None => Err(error_response(
            StatusCode::BAD_REQUEST,
            "No ticket identifier in upload",
        )),
    }
}
