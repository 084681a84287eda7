//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Verification (requests by outcome, latency, superseded completions)
//! - Acquisition (QR decodes, camera sessions)
//! - Backend calls other than verification

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Verification Metrics
// =============================================================================

/// Verification cycles by outcome.
pub static VERIFICATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "ticketgate_verifications_total",
            "Total verification cycles by outcome",
        ),
        &["outcome"], // "success", "rejected", "network", "unauthenticated", "acquisition"
    )
    .unwrap()
});

/// Verification request duration in seconds.
pub static VERIFICATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "ticketgate_verification_duration_seconds",
            "Duration of verification requests",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["outcome"],
    )
    .unwrap()
});

/// Completions ignored because a newer request was dispatched.
pub static STALE_COMPLETIONS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "ticketgate_stale_completions_total",
        "Verification completions dropped because a newer request superseded them",
    )
    .unwrap()
});

// =============================================================================
// Acquisition Metrics
// =============================================================================

/// QR decode results by source.
pub static QR_DECODES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("ticketgate_qr_decodes_total", "QR decode results"),
        &["source", "result"], // source: "camera", "upload"
    )
    .unwrap()
});

/// Camera sessions started.
pub static CAMERA_SESSIONS_STARTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "ticketgate_camera_sessions_started_total",
        "Total camera sessions started",
    )
    .unwrap()
});

/// Camera handles released.
pub static CAMERA_RELEASES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "ticketgate_camera_releases_total",
        "Total camera handles released",
    )
    .unwrap()
});

// =============================================================================
// Backend Metrics
// =============================================================================

/// Backend requests by operation (`verify_ticket`, `public_events`, `feedback`).
pub static BACKEND_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "ticketgate_backend_requests_total",
            "Total backend requests",
        ),
        &["operation", "status"], // status: "success", "rejected", "error"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Verification
        Box::new(VERIFICATIONS_TOTAL.clone()),
        Box::new(VERIFICATION_DURATION.clone()),
        Box::new(STALE_COMPLETIONS.clone()),
        // Acquisition
        Box::new(QR_DECODES.clone()),
        Box::new(CAMERA_SESSIONS_STARTED.clone()),
        Box::new(CAMERA_RELEASES.clone()),
        // Backend
        Box::new(BACKEND_REQUESTS.clone()),
    ]
}
