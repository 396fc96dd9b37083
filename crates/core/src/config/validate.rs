use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Credentials and parent zone name are present
/// - API URL is http(s)
/// - Request timeout is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let cf = &config.cloudflare;

    if cf.email.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "cloudflare.email cannot be empty".to_string(),
        ));
    }

    if cf.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "cloudflare.api_key cannot be empty".to_string(),
        ));
    }

    if cf.zone_name.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "cloudflare.zone_name cannot be empty".to_string(),
        ));
    }

    if !(cf.api_url.starts_with("https://") || cf.api_url.starts_with("http://")) {
        return Err(ConfigError::ValidationError(format!(
            "cloudflare.api_url must be an http(s) URL, got '{}'",
            cf.api_url
        )));
    }

    if cf.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "cloudflare.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
