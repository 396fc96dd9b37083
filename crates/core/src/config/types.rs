use serde::{Deserialize, Serialize};

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub cloudflare: CloudflareConfig,
}

/// Cloudflare account and parent zone configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CloudflareConfig {
    /// API base URL (default: https://api.cloudflare.com/client/v4)
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Account email sent as `X-Auth-Email`
    pub email: String,
    /// Global API key sent as `X-Auth-Key`
    pub api_key: String,
    /// Name of the white-labeled parent zone (e.g. "saasprovider.com")
    pub zone_name: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

pub(crate) fn default_api_url() -> String {
    "https://api.cloudflare.com/client/v4".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub cloudflare: SanitizedCloudflareConfig,
}

/// Sanitized Cloudflare config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCloudflareConfig {
    pub api_url: String,
    pub email: String,
    pub api_key_configured: bool,
    pub zone_name: String,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let cf = &config.cloudflare;
        Self {
            cloudflare: SanitizedCloudflareConfig {
                api_url: cf.api_url.clone(),
                email: cf.email.clone(),
                api_key_configured: !cf.api_key.is_empty(),
                zone_name: cf.zone_name.clone(),
                timeout_secs: cf.timeout_secs,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_valid_config() {
        let toml = r#"
[cloudflare]
email = "ops@saasprovider.com"
api_key = "secret"
zone_name = "saasprovider.com"
timeout_secs = 10
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.cloudflare.email, "ops@saasprovider.com");
        assert_eq!(config.cloudflare.zone_name, "saasprovider.com");
        assert_eq!(config.cloudflare.timeout_secs, 10);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let toml = r#"
[cloudflare]
email = "ops@saasprovider.com"
api_key = "secret"
zone_name = "saasprovider.com"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.cloudflare.api_url,
            "https://api.cloudflare.com/client/v4"
        );
        assert_eq!(config.cloudflare.timeout_secs, 30);
    }

    #[test]
    fn test_deserialize_missing_cloudflare_fails() {
        let toml = r#"
[other]
value = 1
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_missing_api_key_fails() {
        let toml = r#"
[cloudflare]
email = "ops@saasprovider.com"
zone_name = "saasprovider.com"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitized_config_hides_api_key() {
        let config = Config {
            cloudflare: CloudflareConfig {
                api_url: default_api_url(),
                email: "ops@saasprovider.com".to_string(),
                api_key: "super-secret-key".to_string(),
                zone_name: "saasprovider.com".to_string(),
                timeout_secs: 30,
            },
        };

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.cloudflare.api_key_configured);
        assert_eq!(sanitized.cloudflare.zone_name, "saasprovider.com");

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("super-secret-key"));
    }

    #[test]
    fn test_sanitized_config_empty_key() {
        let config = Config {
            cloudflare: CloudflareConfig {
                api_url: default_api_url(),
                email: "ops@saasprovider.com".to_string(),
                api_key: String::new(),
                zone_name: "saasprovider.com".to_string(),
                timeout_secs: 30,
            },
        };

        let sanitized = SanitizedConfig::from(&config);
        assert!(!sanitized.cloudflare.api_key_configured);
    }
}
