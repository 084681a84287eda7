use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which acquisition strategy is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    #[default]
    Camera,
    Upload,
}

impl ScanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanMode::Camera => "camera",
            ScanMode::Upload => "upload",
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "camera" => Ok(ScanMode::Camera),
            "upload" => Ok(ScanMode::Upload),
            other => Err(format!("unknown scan mode '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_camera() {
        assert_eq!(ScanMode::default(), ScanMode::Camera);
    }

    #[test]
    fn test_parse() {
        assert_eq!("Upload".parse::<ScanMode>().unwrap(), ScanMode::Upload);
        assert_eq!(" camera ".parse::<ScanMode>().unwrap(), ScanMode::Camera);
        assert!("nfc".parse::<ScanMode>().is_err());
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&ScanMode::Upload).unwrap(),
            "\"upload\""
        );
    }
}
