//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock dependencies injected, enabling E2E testing of the station API
//! without a booking backend or a camera.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use ticketgate_core::{
    acquisition::ScanSettings,
    config::{BackendConfig, ScannerConfig, ServerConfig},
    testing::{MockCameraDevice, MockVerifier},
    BackendClient, BearerToken, CameraDevice, Config, CredentialStore, PresenterState,
    RqrrDecoder, ScanMode, StationSettings, VerificationStation,
};

/// Re-export fixtures for test convenience
pub use ticketgate_core::testing::fixtures;

/// Boundary used by `post_image`.
const BOUNDARY: &str = "ticketgate-test-boundary";

/// Test fixture for E2E testing with mock dependencies.
///
/// Provides an in-process server with controllable mocks for:
/// - Ticket verification (MockVerifier)
/// - Camera frames (MockCameraDevice)
///
/// QR decoding is real, so frames and uploads should be built with
/// `fixtures::qr_png`.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_verify() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/v1/verify", json!({ "ticket_id": "TKT-1" })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock verifier - queue backend answers
    pub verifier: Arc<MockVerifier>,
    /// Mock camera - feed frames
    pub camera: Arc<MockCameraDevice>,
    /// Station behind the router
    pub station: Arc<VerificationStation>,
    /// Bearer credential shared with the backend client
    pub credentials: CredentialStore,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let verifier = Arc::new(MockVerifier::new());
        let camera = Arc::new(MockCameraDevice::new());

        let mut backend = BackendConfig::new(test_config.backend_url.clone());
        backend.token = test_config.token.clone();
        backend.timeout_secs = 2;

        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
                api_key: test_config.api_key.clone(),
            },
            backend,
            scanner: ScannerConfig {
                default_mode: test_config.default_mode,
                ..Default::default()
            },
        };

        let credentials = CredentialStore::from_config(config.backend.token.as_deref());
        let backend_client = BackendClient::new(&config.backend, credentials.clone())
            .expect("Failed to create backend client");

        let settings = StationSettings {
            default_mode: test_config.default_mode,
            scan: ScanSettings {
                frame_interval: Duration::from_millis(10),
                repeat_cooldown: Duration::from_secs(2),
            },
            request_timeout: Duration::from_secs(2),
        };

        let station = Arc::new(VerificationStation::new(
            Arc::clone(&verifier) as Arc<dyn ticketgate_core::TicketVerifier>,
            Arc::new(RqrrDecoder::new()),
            Some(Arc::clone(&camera) as Arc<dyn CameraDevice>),
            settings,
        ));
        station.start().await;

        // Create app state with mocks
        let state = Arc::new(ticketgate_server::state::AppState::new(
            config,
            Arc::clone(&station),
            credentials.clone(),
            backend_client,
        ));

        // Create router
        let router = ticketgate_server::api::create_router(state);

        Self {
            router,
            verifier,
            camera,
            station,
            credentials,
        }
    }

    /// Install a bearer token directly, bypassing the API.
    pub async fn login(&self, token: &str) {
        let token = BearerToken::new(token).expect("non-empty token");
        self.credentials.set(token).await;
    }

    /// Poll the presenter until `check` holds or a second passes.
    pub async fn wait_for_state(&self, check: impl Fn(&PresenterState) -> bool) -> PresenterState {
        for _ in 0..100 {
            let state = self.station.state().await;
            if check(&state) {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let state = self.station.state().await;
        panic!("presenter never reached the expected state, last: {:?}", state);
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a GET request with extra headers.
    pub async fn get_with_headers(&self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        let mut builder = Request::builder().method("GET").uri(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Upload `bytes` as the multipart `image` field.
    pub async fn post_image(&self, path: &str, bytes: &[u8], content_type: &str) -> TestResponse {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"image\"; filename=\"ticket.png\"\r\n",
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        self.post_multipart(path, body).await
    }

    /// Send a multipart request with no parts at all.
    pub async fn post_empty_multipart(&self, path: &str) -> TestResponse {
        self.post_multipart(path, format!("--{}--\r\n", BOUNDARY).into_bytes())
            .await
    }

    async fn post_multipart(&self, path: &str, body: Vec<u8>) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();

        self.send(request).await
    }

    /// Send a GET and return the raw text body (for /metrics).
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&body_bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Mode the station starts in
    pub default_mode: ScanMode,
    /// Operator key required on station routes
    pub api_key: Option<String>,
    /// Backend used by the events and feedback routes
    pub backend_url: String,
    /// Bearer token configured at startup
    pub token: Option<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            default_mode: ScanMode::Upload,
            api_key: None,
            // Discard port: nothing listens there
            backend_url: "http://127.0.0.1:9/api/".to_string(),
            token: None,
        }
    }
}

impl TestConfig {
    /// Create config starting in camera mode.
    pub fn camera() -> Self {
        Self {
            default_mode: ScanMode::Camera,
            ..Self::default()
        }
    }

    /// Create config requiring an operator key.
    pub fn with_api_key(key: &str) -> Self {
        Self {
            api_key: Some(key.to_string()),
            ..Self::default()
        }
    }

    /// Create config talking to a backend at `url` with a token set.
    pub fn with_backend(url: &str, token: Option<&str>) -> Self {
        Self {
            backend_url: url.to_string(),
            token: token.map(str::to_string),
            ..Self::default()
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
