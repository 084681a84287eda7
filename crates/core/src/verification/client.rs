use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::Form;
use tracing::debug;

use crate::api::{read_envelope, ApiEnvelope, ApiError, BackendClient};
use crate::metrics::BACKEND_REQUESTS;

use super::types::{TicketIdentifier, TicketRecord};

/// Endpoint path relative to the backend base URL.
pub const VERIFY_TICKET_PATH: &str = "bookings/verify_ticket/";

/// Something that can check a ticket identifier against the backend.
///
/// Implementations return the raw envelope; turning it into an outcome is
/// the job of [`classify`](super::classify).
#[async_trait]
pub trait TicketVerifier: Send + Sync {
    /// Returns the name of this verifier implementation.
    fn name(&self) -> &str;

    /// Issue exactly one verification request for `ticket_id`.
    async fn verify(
        &self,
        ticket_id: &TicketIdentifier,
    ) -> Result<ApiEnvelope<TicketRecord>, ApiError>;
}

/// Verifier backed by the booking backend's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpTicketVerifier {
    client: BackendClient,
}

impl HttpTicketVerifier {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TicketVerifier for HttpTicketVerifier {
    fn name(&self) -> &str {
        "http"
    }

    async fn verify(
        &self,
        ticket_id: &TicketIdentifier,
    ) -> Result<ApiEnvelope<TicketRecord>, ApiError> {
        // checked before building anything: no token, no request
        let authorization = self.client.authorization().await?;
        let url = self.client.endpoint(VERIFY_TICKET_PATH)?;

        debug!("Verifying ticket against {}", url);

        let form = Form::new().text("ticket_id", ticket_id.as_str().to_string());

        let sent = self
            .client
            .http()
            .post(url)
            .header(AUTHORIZATION, authorization)
            .multipart(form)
            .send()
            .await
            .map_err(ApiError::from);

        // The record is typed only after `success` is known, so a rejection
        // with an odd payload still carries its message.
        let envelope = match sent {
            Ok(response) => read_envelope::<serde_json::Value>(response)
                .await
                .and_then(|envelope| envelope.into_typed::<TicketRecord>()),
            Err(e) => Err(e),
        };

        let result = match &envelope {
            Ok(envelope) if envelope.success => "success",
            Ok(_) => "rejected",
            Err(_) => "error",
        };
        BACKEND_REQUESTS
            .with_label_values(&["verify_ticket", result])
            .inc();

        envelope
    }
}
