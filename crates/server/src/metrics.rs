//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the ticketgate server:
//! - HTTP request metrics (latency, counts, errors)
//! - Operator API key failures
//! - Station status (collected dynamically)
//!
//! Verification and acquisition metrics live in `ticketgate_core::metrics`
//! and are registered here as well.

use once_cell::sync::Lazy;
use prometheus::{
    core::Collector, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec,
    Opts, Registry, TextEncoder,
};
use regex_lite::Regex;
use tracing::error;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "ticketgate_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("ticketgate_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "ticketgate_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

/// Operator API key failures.
pub static AUTH_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "ticketgate_auth_failures_total",
            "Total operator API key failures",
        ),
        &["reason"], // "missing", "invalid"
    )
    .unwrap()
});

// =============================================================================
// Station Metrics (collected dynamically)
// =============================================================================

/// Presenter state: 1 for the current state, 0 for the others.
pub static PRESENTER_STATE: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new(
            "ticketgate_presenter_state",
            "Current verification screen state (1 = shown)",
        ),
        &["state"],
    )
    .unwrap()
});

/// Camera session running (1) or not (0).
pub static CAMERA_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "ticketgate_camera_active",
        "Whether a camera session is scanning (1) or not (0)",
    )
    .unwrap()
});

/// Bearer token available for backend calls (1) or not (0).
pub static CREDENTIAL_CONFIGURED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "ticketgate_credential_configured",
        "Whether a bearer token is set for backend calls (1) or not (0)",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    let server_metrics: Vec<Box<dyn Collector>> = vec![
        Box::new(HTTP_REQUEST_DURATION.clone()),
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()),
        Box::new(AUTH_FAILURES_TOTAL.clone()),
        Box::new(PRESENTER_STATE.clone()),
        Box::new(CAMERA_ACTIVE.clone()),
        Box::new(CREDENTIAL_CONFIGURED.clone()),
    ];

    // core metrics: verification, acquisition, backend calls
    for metric in server_metrics
        .into_iter()
        .chain(ticketgate_core::metrics::all_metrics())
    {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so the gauges reflect the station right now.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let station = state.station();

    let current = station.state().await;
    for name in ["idle", "pending", "success", "failure"] {
        PRESENTER_STATE
            .with_label_values(&[name])
            .set(i64::from(name == current.name()));
    }

    CAMERA_ACTIVE.set(i64::from(station.camera_active().await));
    CREDENTIAL_CONFIGURED.set(i64::from(state.credentials().is_set().await));
}

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .unwrap()
});
static NUMERIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace IDs with placeholders).
///
/// All routes are static, but unknown paths still reach the middleware and
/// must not blow up label cardinality.
pub fn normalize_path(path: &str) -> String {
    let result = UUID_RE.replace_all(path, "{id}");
    let result = NUMERIC_RE.replace_all(&result, "/{id}$1");
    result.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_uuid() {
        let path = "/api/v1/verify/550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(normalize_path(path), "/api/v1/verify/{id}");
    }

    #[test]
    fn test_normalize_path_numeric_middle() {
        let path = "/api/v1/events/12345/images/2";
        assert_eq!(normalize_path(path), "/api/v1/events/{id}/images/{id}");
    }

    #[test]
    fn test_normalize_path_no_ids() {
        let path = "/api/v1/verify/state";
        assert_eq!(normalize_path(path), "/api/v1/verify/state");
    }

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("ticketgate_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_contains_core_metrics() {
        ticketgate_core::metrics::VERIFICATIONS_TOTAL
            .with_label_values(&["success"])
            .inc_by(0);
        ticketgate_core::metrics::QR_DECODES
            .with_label_values(&["upload", "decoded"])
            .inc_by(0);
        PRESENTER_STATE.with_label_values(&["idle"]).set(1);
        CAMERA_ACTIVE.set(0);

        let output = encode_metrics();

        assert!(output.contains("ticketgate_verifications_total"));
        assert!(output.contains("ticketgate_qr_decodes_total"));
        assert!(output.contains("ticketgate_presenter_state"));
        assert!(output.contains("ticketgate_camera_active"));
    }
}
