//! Public event listing.
//!
//! The only unauthenticated backend endpoint the station uses; the kiosk
//! shows it next to the scanner so staff can see what is on today.

use reqwest::Url;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::api::{read_envelope, ApiError, BackendClient};
use crate::metrics::BACKEND_REQUESTS;

/// Endpoint path relative to the backend base URL.
pub const PUBLIC_EVENTS_PATH: &str = "events/get_public_events/";

/// Shown when the backend rejects without a message.
pub const EVENTS_FAILURE_MESSAGE: &str = "Failed to fetch events.";

/// Event image. `url` is usually relative to the backend base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventImage {
    pub url: String,
}

impl EventImage {
    /// Absolute URL of the image, resolving relative paths against `base`.
    pub fn resolve(&self, base: &Url) -> Option<Url> {
        Url::parse(&self.url)
            .ok()
            .or_else(|| base.join(self.url.trim_start_matches('/')).ok())
    }
}

/// Entry of the public event listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicEvent {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    /// Decimal price as sent by the backend (string or number).
    #[serde(default, deserialize_with = "price_as_string")]
    pub event_price: Option<String>,
    #[serde(default)]
    pub images: Vec<EventImage>,
}

impl PublicEvent {
    /// First image, used as the cover.
    pub fn cover(&self) -> Option<&EventImage> {
        self.images.first()
    }
}

fn price_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Fetch the public event listing.
///
/// Unlike ticket verification, a non-2xx status is a failure even when the
/// body says otherwise.
pub async fn fetch_public_events(client: &BackendClient) -> Result<Vec<PublicEvent>, ApiError> {
    let url = client.endpoint(PUBLIC_EVENTS_PATH)?;
    debug!("Fetching public events from {}", url);

    let response = match client.http().get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            BACKEND_REQUESTS
                .with_label_values(&["public_events", "error"])
                .inc();
            return Err(e.into());
        }
    };

    let status = response.status();
    let envelope = match read_envelope::<Vec<PublicEvent>>(response).await {
        Ok(envelope) => envelope,
        Err(e) => {
            BACKEND_REQUESTS
                .with_label_values(&["public_events", "error"])
                .inc();
            return Err(e);
        }
    };

    if status.is_success() && envelope.success {
        BACKEND_REQUESTS
            .with_label_values(&["public_events", "success"])
            .inc();
        let events = envelope.data.unwrap_or_default();
        debug!("Fetched {} public event(s)", events.len());
        Ok(events)
    } else {
        BACKEND_REQUESTS
            .with_label_values(&["public_events", "rejected"])
            .inc();
        let message = envelope.message_or(EVENTS_FAILURE_MESSAGE);
        warn!("Public events request rejected ({}): {}", status, message);
        Err(ApiError::Rejected(message))
    }
}
