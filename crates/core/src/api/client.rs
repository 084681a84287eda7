use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{ApiEnvelope, ApiError};
use crate::config::BackendConfig;
use crate::credential::CredentialStore;

/// HTTP client bound to one backend base URL and one credential store.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
    credentials: CredentialStore,
    timeout: Duration,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// The base URL always gets a trailing slash so endpoint paths are
    /// appended to it rather than replacing its last segment.
    pub fn new(config: &BackendConfig, credentials: CredentialStore) -> Result<Self, ApiError> {
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|e| {
            ApiError::NotConfigured(format!("invalid base_url '{}': {}", config.base_url, e))
        })?;

        let timeout = config.timeout();
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            credentials,
            timeout,
        })
    }

    pub fn http(&self) -> &Client {
        &self.client
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Resolve an endpoint path (e.g. "bookings/verify_ticket/") against the
    /// base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::NotConfigured(format!("invalid endpoint '{}': {}", path, e)))
    }

    /// `Authorization` header value from the current credential.
    pub async fn authorization(&self) -> Result<String, ApiError> {
        self.credentials
            .current()
            .await
            .map(|token| token.header_value())
            .ok_or(ApiError::MissingCredential)
    }
}

/// Read a response body as an envelope.
///
/// The HTTP status is not consulted: the backend reports rejections as a
/// JSON envelope on 4xx responses, so the body decides.
pub async fn read_envelope<T: DeserializeOwned>(
    response: Response,
) -> Result<ApiEnvelope<T>, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    debug!("Backend responded with status {} ({} bytes)", status, body.len());

    serde_json::from_str(&body).map_err(|e| {
        ApiError::ParseError(format!("unexpected body (status {}): {}", status.as_u16(), e))
    })
}
