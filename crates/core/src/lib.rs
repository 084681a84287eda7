pub mod acquisition;
pub mod api;
pub mod config;
pub mod credential;
pub mod events;
pub mod feedback;
pub mod metrics;
pub mod presenter;
pub mod station;
pub mod testing;
pub mod verification;

pub use acquisition::{
    AcquisitionError, CameraDevice, QrDecoder, RqrrDecoder, ScanMode, SnapshotCamera,
    UploadedImage,
};
pub use api::{ApiEnvelope, ApiError, BackendClient};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use credential::{BearerToken, CredentialStore};
pub use events::{fetch_public_events, EventImage, PublicEvent};
pub use feedback::{submit_feedback, FeedbackError, FeedbackForm};
pub use presenter::{Presenter, PresenterState};
pub use station::{ScanStatus, StationSettings, VerificationStation};
pub use verification::{
    classify, FailureKind, HttpTicketVerifier, TicketIdentifier, TicketRecord, TicketVerifier,
    VerificationFailure, VerificationOutcome,
};
