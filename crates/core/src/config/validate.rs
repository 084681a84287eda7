use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Backend base URL is an http(s) URL
/// - Backend timeout is positive
/// - Scanner fps is within 1..=60
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    let base_url = config.backend.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "backend.base_url must be an http(s) URL, got '{}'",
            config.backend.base_url
        )));
    }
    if reqwest::Url::parse(base_url).is_err() {
        return Err(ConfigError::ValidationError(format!(
            "backend.base_url is not a valid URL: '{}'",
            config.backend.base_url
        )));
    }

    if config.backend.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "backend.timeout_secs must be greater than 0".to_string(),
        ));
    }

    if !(1..=60).contains(&config.scanner.fps) {
        return Err(ConfigError::ValidationError(format!(
            "scanner.fps must be between 1 and 60, got {}",
            config.scanner.fps
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BackendConfig, ScannerConfig, ServerConfig};
    use std::net::IpAddr;

    fn valid_config() -> Config {
        Config {
            server: ServerConfig::default(),
            backend: BackendConfig::new("https://events.example.com/api/"),
            scanner: ScannerConfig::default(),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = valid_config();
        config.server = ServerConfig {
            host: "0.0.0.0".parse::<IpAddr>().unwrap(),
            port: 0,
            api_key: None,
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_base_url_scheme() {
        let mut config = valid_config();
        config.backend.base_url = "ftp://events.example.com/".to_string();
        assert!(validate_config(&config).is_err());

        config.backend.base_url = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let mut config = valid_config();
        config.backend.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_fps_bounds() {
        let mut config = valid_config();
        config.scanner.fps = 0;
        assert!(validate_config(&config).is_err());

        config.scanner.fps = 61;
        assert!(validate_config(&config).is_err());

        config.scanner.fps = 60;
        assert!(validate_config(&config).is_ok());
    }
}
