use std::sync::Arc;
use ticketgate_core::{BackendClient, Config, CredentialStore, SanitizedConfig, VerificationStation};

/// Shared application state
pub struct AppState {
    config: Config,
    station: Arc<VerificationStation>,
    credentials: CredentialStore,
    backend: BackendClient,
}

impl AppState {
    pub fn new(
        config: Config,
        station: Arc<VerificationStation>,
        credentials: CredentialStore,
        backend: BackendClient,
    ) -> Self {
        Self {
            config,
            station,
            credentials,
            backend,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn station(&self) -> &VerificationStation {
        self.station.as_ref()
    }

    /// Bearer credential used for backend calls.
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Client for the backend endpoints called directly by handlers
    /// (events, feedback).
    pub fn backend(&self) -> &BackendClient {
        &self.backend
    }
}
