use crate::app_config::{AppConfig, Environment, RankSettings};
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
/// Decoupled from the real environment so tests can pass a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_weight = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value: f64 = parse_as(var, &or_default(var, default))?;
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected a non-negative number, got {value}"),
            });
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("PRODLENS_ENV", "development"))?;
    let bind_addr: SocketAddr = parse_as(
        "PRODLENS_BIND_ADDR",
        &or_default("PRODLENS_BIND_ADDR", "0.0.0.0:8000"),
    )?;
    let log_level = or_default("PRODLENS_LOG_LEVEL", "info");

    let gemini_api_key = optional("GEMINI_API_KEY");
    let llm_model = or_default("PRODLENS_LLM_MODEL", "gemini-2.5-flash");
    let llm_timeout_secs = parse_as(
        "PRODLENS_LLM_TIMEOUT_SECS",
        &or_default("PRODLENS_LLM_TIMEOUT_SECS", "30"),
    )?;

    let fetch_timeout_secs = parse_as(
        "PRODLENS_FETCH_TIMEOUT_SECS",
        &or_default("PRODLENS_FETCH_TIMEOUT_SECS", "15"),
    )?;
    let fetch_max_retries = parse_as(
        "PRODLENS_FETCH_MAX_RETRIES",
        &or_default("PRODLENS_FETCH_MAX_RETRIES", "2"),
    )?;
    let fetch_backoff_base_ms = parse_as(
        "PRODLENS_FETCH_BACKOFF_BASE_MS",
        &or_default("PRODLENS_FETCH_BACKOFF_BASE_MS", "500"),
    )?;
    let fetch_max_body_bytes = parse_as(
        "PRODLENS_FETCH_MAX_BODY_BYTES",
        &or_default("PRODLENS_FETCH_MAX_BODY_BYTES", "10485760"),
    )?;

    let search_site_timeout_secs = parse_as(
        "PRODLENS_SEARCH_SITE_TIMEOUT_SECS",
        &or_default("PRODLENS_SEARCH_SITE_TIMEOUT_SECS", "10"),
    )?;
    let search_deadline_secs = parse_as(
        "PRODLENS_SEARCH_DEADLINE_SECS",
        &or_default("PRODLENS_SEARCH_DEADLINE_SECS", "25"),
    )?;
    let search_max_concurrency = parse_as(
        "PRODLENS_SEARCH_MAX_CONCURRENCY",
        &or_default("PRODLENS_SEARCH_MAX_CONCURRENCY", "4"),
    )?;
    let search_max_candidates_per_site = parse_as(
        "PRODLENS_SEARCH_MAX_CANDIDATES_PER_SITE",
        &or_default("PRODLENS_SEARCH_MAX_CANDIDATES_PER_SITE", "3"),
    )?;

    let api_rate_limit_requests: usize = parse_nonzero(
        "PRODLENS_API_RATE_LIMIT_REQUESTS",
        &or_default("PRODLENS_API_RATE_LIMIT_REQUESTS", "60"),
    )?;
    let api_rate_limit_window_secs: u64 = parse_nonzero(
        "PRODLENS_API_RATE_LIMIT_WINDOW_SECS",
        &or_default("PRODLENS_API_RATE_LIMIT_WINDOW_SECS", "60"),
    )?;

    let defaults = RankSettings::default();
    let rank = RankSettings {
        title_weight: parse_weight(
            "PRODLENS_RANK_TITLE_WEIGHT",
            &defaults.title_weight.to_string(),
        )?,
        price_weight: parse_weight(
            "PRODLENS_RANK_PRICE_WEIGHT",
            &defaults.price_weight.to_string(),
        )?,
        rating_weight: parse_weight(
            "PRODLENS_RANK_RATING_WEIGHT",
            &defaults.rating_weight.to_string(),
        )?,
        brand_weight: parse_weight(
            "PRODLENS_RANK_BRAND_WEIGHT",
            &defaults.brand_weight.to_string(),
        )?,
        price_threshold: parse_price_threshold(&or_default(
            "PRODLENS_RANK_PRICE_THRESHOLD",
            &defaults.price_threshold.to_string(),
        ))?,
    };

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        gemini_api_key,
        llm_model,
        llm_timeout_secs,
        fetch_timeout_secs,
        fetch_max_retries,
        fetch_backoff_base_ms,
        fetch_max_body_bytes,
        search_site_timeout_secs,
        search_deadline_secs,
        search_max_concurrency,
        search_max_candidates_per_site,
        rank,
        api_rate_limit_requests,
        api_rate_limit_window_secs,
    })
}

fn parse_as<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

fn parse_nonzero<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + Default + PartialEq,
    T::Err: std::fmt::Display,
{
    let value: T = parse_as(var, raw)?;
    if value == T::default() {
        return Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "production" => Ok(Environment::Production),
        "test" => Ok(Environment::Test),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PRODLENS_ENV".to_string(),
            reason: format!("expected development, test, or production; got \"{other}\""),
        }),
    }
}

/// The threshold must sit strictly inside `(0, 1)` or the price curve
/// degenerates.
fn parse_price_threshold(raw: &str) -> Result<f64, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: "PRODLENS_RANK_PRICE_THRESHOLD".to_string(),
        reason,
    };
    let value: f64 = raw.trim().parse().map_err(|e| invalid(format!("{e}")))?;
    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(invalid(format!("expected a value between 0 and 1, got {value}")))
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
