//! Input acquisition: turning camera frames or uploaded images into ticket
//! identifiers.
//!
//! Two strategies share one contract: decoded text that is empty never
//! reaches the verifier.
//! - Camera: [`CameraSession`] drives a lazy stream of decode attempts over a
//!   [`CameraHandle`] that is released exactly once, whatever ends the
//!   session.
//! - Upload: [`decode_upload`] decodes a single still image.

mod camera;
mod decoder;
mod mode;
mod snapshot;
mod upload;

pub use camera::*;
pub use decoder::*;
pub use mode::*;
pub use snapshot::*;
pub use upload::*;

use thiserror::Error;

use crate::verification::{FailureKind, VerificationOutcome};

/// Shown when an uploaded image holds no readable QR code.
pub const INVALID_IMAGE_MESSAGE: &str = "Invalid QR code image";

/// Shown when the camera cannot be opened.
pub const CAMERA_UNAVAILABLE_MESSAGE: &str = "Unable to start the camera";

/// Shown when the camera fails while scanning.
pub const CAMERA_STOPPED_MESSAGE: &str = "Camera stopped unexpectedly";

/// Errors raised while obtaining a QR payload.
#[derive(Debug, Clone, Error)]
pub enum AcquisitionError {
    /// Image could not be loaded or holds no QR code.
    #[error("Invalid QR code image: {0}")]
    InvalidImage(String),

    /// Camera missing or could not be opened.
    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    /// Camera failed after it was opened.
    #[error("Camera capture failed: {0}")]
    CaptureFailed(String),
}

impl AcquisitionError {
    /// Fixed user-facing message for this error.
    pub fn user_message(&self) -> &'static str {
        match self {
            AcquisitionError::InvalidImage(_) => INVALID_IMAGE_MESSAGE,
            AcquisitionError::CameraUnavailable(_) => CAMERA_UNAVAILABLE_MESSAGE,
            AcquisitionError::CaptureFailed(_) => CAMERA_STOPPED_MESSAGE,
        }
    }

    pub fn to_outcome(&self) -> VerificationOutcome {
        VerificationOutcome::failure(FailureKind::Acquisition, self.user_message())
    }
}
