use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::acquisition::ScanMode;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
}

/// Door-station HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Operator key required on `/api/v1` routes when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_key: None,
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    8080
}

/// Booking backend the station talks to.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// API root, e.g. "https://events.example.com/api/". Endpoint paths are
    /// appended to it.
    pub base_url: String,
    /// Bearer token to start with. Can be replaced at runtime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Request timeout in seconds (default: 15)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_timeout_secs() -> u64 {
    15
}

/// Input acquisition configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScannerConfig {
    /// Mode the station starts in.
    #[serde(default)]
    pub default_mode: ScanMode,
    /// Camera frames examined per second.
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Window during which the same payload seen again by the camera is
    /// treated as the same detection. 0 disables collapsing.
    #[serde(default = "default_repeat_cooldown_ms")]
    pub repeat_cooldown_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraConfig>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            default_mode: ScanMode::default(),
            fps: default_fps(),
            repeat_cooldown_ms: default_repeat_cooldown_ms(),
            camera: None,
        }
    }
}

impl ScannerConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.fps.max(1)))
    }

    pub fn repeat_cooldown(&self) -> Duration {
        Duration::from_millis(self.repeat_cooldown_ms)
    }
}

fn default_fps() -> u32 {
    10
}

fn default_repeat_cooldown_ms() -> u64 {
    2000
}

/// Snapshot camera: an external capture daemon keeps overwriting this file
/// with the latest frame (PNG or JPEG).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CameraConfig {
    pub snapshot_path: PathBuf,
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: SanitizedServerConfig,
    pub backend: SanitizedBackendConfig,
    pub scanner: ScannerConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub api_key_configured: bool,
}

/// Backend config with the token hidden
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedBackendConfig {
    pub base_url: String,
    pub token_configured: bool,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: SanitizedServerConfig {
                host: config.server.host,
                port: config.server.port,
                api_key_configured: config
                    .server
                    .api_key
                    .as_deref()
                    .is_some_and(|k| !k.is_empty()),
            },
            backend: SanitizedBackendConfig {
                base_url: config.backend.base_url.clone(),
                token_configured: config
                    .backend
                    .token
                    .as_deref()
                    .is_some_and(|t| !t.is_empty()),
                timeout_secs: config.backend.timeout_secs,
            },
            scanner: config.scanner.clone(),
        }
    }
}
