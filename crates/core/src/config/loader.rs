use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Unprefixed variables older deployment scripts export.
const LEGACY_ENV_KEYS: [&str; 3] = ["CF_API_KEY", "CF_API_EMAIL", "CF_ZONE"];

/// Load configuration from file with environment variable overrides.
///
/// Precedence (lowest to highest): the TOML file, the legacy `CF_*`
/// variables, then `EDGECERT_` prefixed variables using `__` as the
/// nesting separator (e.g. `EDGECERT_CLOUDFLARE__API_KEY`).
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(legacy_env())
        .merge(Env::prefixed("EDGECERT_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn legacy_env() -> Env {
    Env::raw()
        .only(&LEGACY_ENV_KEYS)
        .map(|key| match key.as_str().to_ascii_uppercase().as_str() {
            "CF_API_KEY" => "cloudflare.api_key".into(),
            "CF_API_EMAIL" => "cloudflare.email".into(),
            "CF_ZONE" => "cloudflare.zone_name".into(),
            _ => key.into(),
        })
}
