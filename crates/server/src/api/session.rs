//! Bearer credential handlers.
//!
//! The login flow runs elsewhere; it hands the resulting token to the
//! station here.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use ticketgate_core::BearerToken;

use super::handlers::{error_response, ErrorResponse};
use crate::state::AppState;

/// Request body for setting the bearer token
#[derive(Debug, Deserialize)]
pub struct SetTokenBody {
    pub token: String,
}

/// PUT /api/v1/session/token
pub async fn set_token(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetTokenBody>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let token = BearerToken::new(body.token)
        .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "token must not be empty"))?;

    state.credentials().set(token).await;
    info!("Bearer token updated");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/session/token
pub async fn clear_token(State(state): State<Arc<AppState>>) -> StatusCode {
    state.credentials().clear().await;
    info!("Bearer token cleared");
    StatusCode::NO_CONTENT
}
