use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_GOOGLE_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/";
pub const DEFAULT_NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org/";
pub const DEFAULT_REGISTRY_BASE_URL: &str = "https://brasilapi.com.br/api/";
pub const DEFAULT_USER_AGENT: &str = "revloc/0.1 (reseller-locator)";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can use a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_count = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
        Ok(value)
    };

    let parse_km = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value = or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if !value.is_finite() || value <= 0.0 {
            return Err(invalid(var, "must be a positive number".to_string()));
        }
        Ok(value)
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("REVLOC_ENV", "development"));
    let bind_addr = parse_addr("REVLOC_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("REVLOC_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("REVLOC_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("REVLOC_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("REVLOC_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let google_maps_api_key = optional("GOOGLE_MAPS_API_KEY");
    let http_timeout_secs = parse_u64("REVLOC_HTTP_TIMEOUT_SECS", "10")?;
    let user_agent = or_default("REVLOC_USER_AGENT", DEFAULT_USER_AGENT);
    let google_base_url = or_default("REVLOC_GOOGLE_BASE_URL", DEFAULT_GOOGLE_BASE_URL);
    let nominatim_base_url = or_default("REVLOC_NOMINATIM_BASE_URL", DEFAULT_NOMINATIM_BASE_URL);
    let registry_base_url = or_default("REVLOC_REGISTRY_BASE_URL", DEFAULT_REGISTRY_BASE_URL);
    let nominatim_min_interval_ms = parse_u64("REVLOC_NOMINATIM_MIN_INTERVAL_MS", "1000")?;
    let rate_limit_backoff_ms = parse_u64("REVLOC_RATE_LIMIT_BACKOFF_MS", "500")?;

    let search_max_distance_km = parse_km("REVLOC_SEARCH_MAX_DISTANCE_KM", "50.0")?;
    let search_limit = parse_count("REVLOC_SEARCH_LIMIT", "10")?;

    let enrich_batch_size = parse_count("REVLOC_ENRICH_BATCH_SIZE", "10")?;
    let enrich_batch_delay_ms = parse_u64("REVLOC_ENRICH_BATCH_DELAY_MS", "1000")?;
    let enrich_record_delay_ms = parse_u64("REVLOC_ENRICH_RECORD_DELAY_MS", "300")?;
    let smart_enrich_cap = parse_count("REVLOC_SMART_ENRICH_CAP", "1000")?;
    let smart_enrich_batch_size = parse_count("REVLOC_SMART_ENRICH_BATCH_SIZE", "15")?;
    let smart_enrich_batch_delay_ms = parse_u64("REVLOC_SMART_ENRICH_BATCH_DELAY_MS", "500")?;
    let registry_batch_concurrency = parse_count("REVLOC_REGISTRY_BATCH_CONCURRENCY", "3")?;
    let registry_batch_delay_ms = parse_u64("REVLOC_REGISTRY_BATCH_DELAY_MS", "300")?;
    let geocode_batch_concurrency = parse_count("REVLOC_GEOCODE_BATCH_CONCURRENCY", "5")?;
    let geocode_batch_delay_ms = parse_u64("REVLOC_GEOCODE_BATCH_DELAY_MS", "200")?;
    let enrich_cron = optional("REVLOC_ENRICH_CRON");

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        google_maps_api_key,
        http_timeout_secs,
        user_agent,
        google_base_url,
        nominatim_base_url,
        registry_base_url,
        nominatim_min_interval_ms,
        rate_limit_backoff_ms,
        search_max_distance_km,
        search_limit,
        enrich_batch_size,
        enrich_batch_delay_ms,
        enrich_record_delay_ms,
        smart_enrich_cap,
        smart_enrich_batch_size,
        smart_enrich_batch_delay_ms,
        registry_batch_concurrency,
        registry_batch_delay_ms,
        geocode_batch_concurrency,
        geocode_batch_delay_ms,
        enrich_cron,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
