//! Events and feedback routes against a local fake backend.

mod common;

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use common::{fixtures, TestConfig, TestFixture};

async fn public_events() -> Json<Value> {
    let mut relative = fixtures::public_event(2, "Opera");
    relative.images[0].url = "/media/events/opera.jpg".to_string();

    Json(json!({
        "success": true,
        "data": [fixtures::public_event(1, "Jazz Night"), relative],
    }))
}

async fn broken_events() -> impl IntoResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false, "message": "Database unavailable" })),
    )
}

async fn add_feedback(headers: HeaderMap, Json(body): Json<Value>) -> axum::response::Response {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if bearer != "Bearer visitor-token" {
        return (StatusCode::UNAUTHORIZED, Json(fixtures::rejection_body("Bad token")))
            .into_response();
    }

    if body["rating"] == json!(1) {
        Json(fixtures::rejection_body("")).into_response()
    } else {
        Json(json!({ "success": true, "message": "Thanks!" })).into_response()
    }
}

/// Start a fake backend and return its API base URL.
async fn spawn_backend(events_ok: bool) -> String {
    let events = if events_ok {
        get(public_events)
    } else {
        get(broken_events)
    };

    let app = Router::new()
        .route("/api/events/get_public_events/", events)
        .route("/api/feedback/add_feedback/", post(add_feedback));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/api/", addr)
}

fn feedback(rating: u8) -> Value {
    json!({
        "name": "Ada",
        "email": "ada@example.com",
        "message": "Smooth entry",
        "rating": rating,
    })
}

// =============================================================================
// Events
// =============================================================================

#[tokio::test]
async fn test_events_listed_with_cover_urls() {
    let base_url = spawn_backend(true).await;
    let fixture = TestFixture::with_config(TestConfig::with_backend(&base_url, None)).await;

    let response = fixture.get("/api/v1/events").await;

    assert_status!(response, StatusCode::OK);
    let events = response.body.as_array().expect("array of events");
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["title"], "Jazz Night");
    assert_eq!(
        events[0]["cover_url"],
        "https://cdn.example.com/events/1.jpg"
    );
    let opera_cover = events[1]["cover_url"].as_str().unwrap();
    assert!(opera_cover.starts_with("http://127.0.0.1:"));
    assert!(opera_cover.ends_with("/media/events/opera.jpg"));
}

#[tokio::test]
async fn test_events_backend_failure_is_bad_gateway() {
    let base_url = spawn_backend(false).await;
    let fixture = TestFixture::with_config(TestConfig::with_backend(&base_url, None)).await;

    let response = fixture.get("/api/v1/events").await;

    assert_status!(response, StatusCode::BAD_GATEWAY);
    assert_json_path!(response.body, "error", json!("Database unavailable"));
}

#[tokio::test]
async fn test_events_unreachable_backend() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/events").await;

    assert_status!(response, StatusCode::BAD_GATEWAY);
    assert_json_path!(response.body, "error", json!("Failed to fetch events."));
}

// =============================================================================
// Feedback
// =============================================================================

#[tokio::test]
async fn test_feedback_accepted() {
    let base_url = spawn_backend(true).await;
    let fixture =
        TestFixture::with_config(TestConfig::with_backend(&base_url, Some("visitor-token"))).await;

    let response = fixture.post("/api/v1/feedback", feedback(5)).await;

    assert_status!(response, StatusCode::OK);
    assert_json_path!(response.body, "message", json!("Thanks!"));
}

#[tokio::test]
async fn test_feedback_rejected_uses_default_message() {
    let base_url = spawn_backend(true).await;
    let fixture =
        TestFixture::with_config(TestConfig::with_backend(&base_url, Some("visitor-token"))).await;

    let response = fixture.post("/api/v1/feedback", feedback(1)).await;

    assert_status!(response, StatusCode::UNPROCESSABLE_ENTITY);
    assert_json_path!(
        response.body,
        "error",
        json!("Submission failed. Please try again.")
    );
}

#[tokio::test]
async fn test_feedback_validation() {
    let fixture = TestFixture::new().await;

    let response = fixture.post("/api/v1/feedback", feedback(0)).await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_json_path!(
        response.body,
        "error",
        json!("Please complete all fields and rating!")
    );

    let mut bad_email = feedback(4);
    bad_email["email"] = json!("not-an-email");
    let response = fixture.post("/api/v1/feedback", bad_email).await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_json_path!(
        response.body,
        "error",
        json!("Please enter a valid email address.")
    );
}

#[tokio::test]
async fn test_feedback_without_token_is_unauthorized() {
    let base_url = spawn_backend(true).await;
    let fixture = TestFixture::with_config(TestConfig::with_backend(&base_url, None)).await;

    let response = fixture.post("/api/v1/feedback", feedback(5)).await;

    assert_status!(response, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_set_through_api_reaches_backend() {
    let base_url = spawn_backend(true).await;
    let fixture = TestFixture::with_config(TestConfig::with_backend(&base_url, None)).await;

    let response = fixture
        .put("/api/v1/session/token", json!({ "token": "visitor-token" }))
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let response = fixture.post("/api/v1/feedback", feedback(4)).await;
    assert_status!(response, StatusCode::OK);
}
