//! Scan mode API handlers.

use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;
use ticketgate_core::{ScanMode, ScanStatus};

use crate::state::AppState;

/// Request body for switching scan mode
#[derive(Debug, Deserialize)]
pub struct SetModeBody {
    pub mode: ScanMode,
}

/// GET /api/v1/scan/mode
pub async fn get_mode(State(state): State<Arc<AppState>>) -> Json<ScanStatus> {
    Json(state.station().scan_status().await)
}

/// PUT /api/v1/scan/mode
///
/// Switching away from camera releases it before responding.
pub async fn set_mode(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetModeBody>,
) -> Json<ScanStatus> {
    Json(state.station().set_mode(body.mode).await)
}
