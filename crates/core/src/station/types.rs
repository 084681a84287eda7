//! Types for the verification station.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::acquisition::{ScanMode, ScanSettings};
use crate::config::Config;

/// Runtime settings for a [`VerificationStation`](super::VerificationStation).
#[derive(Debug, Clone, Copy)]
pub struct StationSettings {
    /// Mode entered by `start()`.
    pub default_mode: ScanMode,
    /// Camera pacing.
    pub scan: ScanSettings,
    /// Upper bound for one verification request.
    pub request_timeout: Duration,
}

impl StationSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_mode: config.scanner.default_mode,
            scan: ScanSettings {
                frame_interval: config.scanner.frame_interval(),
                repeat_cooldown: config.scanner.repeat_cooldown(),
            },
            request_timeout: config.backend.timeout(),
        }
    }
}

impl Default for StationSettings {
    fn default() -> Self {
        Self {
            default_mode: ScanMode::default(),
            scan: ScanSettings::default(),
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// Current scan mode and camera state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStatus {
    pub mode: ScanMode,
    /// A camera session is scanning right now.
    pub camera_active: bool,
    /// Name of the configured camera device, if any.
    pub camera_device: Option<String>,
}
