use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, Method,
    },
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::{events, feedback, handlers, middleware as mw, scan, session, verify};
use crate::state::AppState;

/// Largest accepted QR image upload.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Station routes, behind the operator key when one is configured
    let protected = Router::new()
        .route("/config", get(handlers::get_config))
        // Verification
        .route("/verify", post(verify::verify))
        .route("/verify/state", get(verify::get_state))
        .route(
            "/verify/upload",
            post(verify::verify_upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        // Acquisition
        .route("/scan/mode", get(scan::get_mode).put(scan::set_mode))
        // Backend credential
        .route(
            "/session/token",
            put(session::set_token).delete(session::clear_token),
        )
        // Backend passthrough
        .route("/events", get(events::list_events))
        .route("/feedback", post(feedback::post_feedback))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            mw::api_key_middleware,
        ));

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static("x-api-key"),
        ])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::get_metrics))
        .layer(middleware::from_fn(mw::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
