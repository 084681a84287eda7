//! Public event listing handler.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use ticketgate_core::{events::EVENTS_FAILURE_MESSAGE, fetch_public_events, ApiError, PublicEvent};

use super::handlers::{error_response, ErrorResponse};
use crate::state::AppState;

/// Event with its cover image resolved to an absolute URL
#[derive(Debug, Serialize)]
pub struct EventResponse {
    #[serde(flatten)]
    pub event: PublicEvent,
    pub cover_url: Option<String>,
}

/// GET /api/v1/events
pub async fn list_events(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<EventResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let backend = state.backend();

    match fetch_public_events(backend).await {
        Ok(events) => Ok(Json(
            events
                .into_iter()
                .map(|event| {
                    let cover_url = event
                        .cover()
                        .and_then(|image| image.resolve(backend.base_url()))
                        .map(|url| url.to_string());
                    EventResponse { event, cover_url }
                })
                .collect(),
        )),
        Err(ApiError::Rejected(message)) => Err(error_response(StatusCode::BAD_GATEWAY, message)),
        Err(_) => Err(error_response(
            StatusCode::BAD_GATEWAY,
            EVENTS_FAILURE_MESSAGE,
        )),
    }
}
