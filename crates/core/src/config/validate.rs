use super::{types::Config, ConfigError};

/// Validate a loaded configuration before the server starts.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.gateway.request_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "gateway.request_timeout_secs must be greater than 0".to_string(),
        ));
    }

    if let Some(base_url) = &config.gateway.base_url {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "gateway.base_url must start with http:// or https://, got: {}",
                base_url
            )));
        }
        if base_url.ends_with('/') {
            return Err(ConfigError::ValidationError(
                "gateway.base_url must not end with a slash".to_string(),
            ));
        }
    }

    if config.rate_limit.enabled {
        if config.rate_limit.requests_per_minute == 0 {
            return Err(ConfigError::ValidationError(
                "rate_limit.requests_per_minute must be greater than 0".to_string(),
            ));
        }
        if config.rate_limit.max_tracked_clients == 0 {
            return Err(ConfigError::ValidationError(
                "rate_limit.max_tracked_clients must be greater than 0".to_string(),
            ));
        }
    }

    if config.addon.id.is_empty() {
        return Err(ConfigError::ValidationError(
            "addon.id must not be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.gateway.request_timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_base_url_scheme_required() {
        let mut config = Config::default();
        config.gateway.base_url = Some("debridge.example.com".to_string());
        assert!(validate_config(&config).is_err());

        config.gateway.base_url = Some("https://debridge.example.com".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_base_url_trailing_slash_rejected() {
        let mut config = Config::default();
        config.gateway.base_url = Some("https://debridge.example.com/".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_rpm_rejected_only_when_enabled() {
        let mut config = Config::default();
        config.rate_limit.requests_per_minute = 0;
        assert!(validate_config(&config).is_err());

        config.rate_limit.enabled = false;
        assert!(validate_config(&config).is_ok());
    }
}
