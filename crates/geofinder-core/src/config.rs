use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a usable
/// configuration pointed at the public Nominatim instance.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let env = parse_environment(&or_default("GEOFINDER_ENV", "development"))?;
    let log_level = or_default("GEOFINDER_LOG_LEVEL", "info");
    let bind_addr: SocketAddr = parse_var(&lookup, "GEOFINDER_BIND_ADDR", "0.0.0.0:3000")?;

    let nominatim_url = or_default(
        "GEOFINDER_NOMINATIM_URL",
        "https://nominatim.openstreetmap.org",
    );
    let proxy_origin = optional("GEOFINDER_PROXY_ORIGIN");
    let photon_url = optional("GEOFINDER_PHOTON_URL");
    let user_agent = or_default("GEOFINDER_USER_AGENT", "geofinder/0.1 (store-locator)");

    let request_timeout_secs = parse_var(&lookup, "GEOFINDER_REQUEST_TIMEOUT_SECS", "10")?;
    let search_limit = parse_var(&lookup, "GEOFINDER_SEARCH_LIMIT", "8")?;
    let min_query_chars = parse_var(&lookup, "GEOFINDER_MIN_QUERY_CHARS", "3")?;
    let debounce_ms = parse_var(&lookup, "GEOFINDER_DEBOUNCE_MS", "250")?;
    let focus_zoom: u8 = parse_var(&lookup, "GEOFINDER_FOCUS_ZOOM", "15")?;
    if focus_zoom > 19 {
        return Err(ConfigError::InvalidEnvVar {
            var: "GEOFINDER_FOCUS_ZOOM".to_string(),
            reason: format!("zoom {focus_zoom} exceeds the maximum tile zoom of 19"),
        });
    }
    let geolocation_timeout_secs = parse_var(&lookup, "GEOFINDER_GEOLOCATION_TIMEOUT_SECS", "10")?;
    let geolocation_max_age_secs = parse_var(&lookup, "GEOFINDER_GEOLOCATION_MAX_AGE_SECS", "60")?;

    let stores_path = PathBuf::from(or_default("GEOFINDER_STORES_PATH", "./config/stores.yaml"));

    Ok(AppConfig {
        env,
        log_level,
        bind_addr,
        nominatim_url,
        proxy_origin,
        photon_url,
        user_agent,
        request_timeout_secs,
        search_limit,
        min_query_chars,
        debounce_ms,
        focus_zoom,
        geolocation_timeout_secs,
        geolocation_max_age_secs,
        stores_path,
    })
}

fn parse_var<F, T>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(var).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "GEOFINDER_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
