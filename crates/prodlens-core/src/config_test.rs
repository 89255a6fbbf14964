use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_test() {
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "PRODLENS_ENV"));
}

#[test]
fn build_app_config_succeeds_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:8000");
    assert_eq!(cfg.log_level, "info");
    assert!(cfg.gemini_api_key.is_none());
    assert_eq!(cfg.llm_model, "gemini-2.5-flash");
    assert_eq!(cfg.llm_timeout_secs, 30);
    assert_eq!(cfg.fetch_timeout_secs, 15);
    assert_eq!(cfg.fetch_max_retries, 2);
    assert_eq!(cfg.fetch_backoff_base_ms, 500);
    assert_eq!(cfg.fetch_max_body_bytes, 10_485_760);
    assert_eq!(cfg.search_site_timeout_secs, 10);
    assert_eq!(cfg.search_deadline_secs, 25);
    assert_eq!(cfg.search_max_concurrency, 4);
    assert_eq!(cfg.search_max_candidates_per_site, 3);
    assert_eq!(cfg.rank, RankSettings::default());
    assert_eq!(cfg.api_rate_limit_requests, 60);
    assert_eq!(cfg.api_rate_limit_window_secs, 60);
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = HashMap::new();
    map.insert("PRODLENS_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRODLENS_BIND_ADDR"),
        "expected InvalidEnvVar(PRODLENS_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn gemini_api_key_is_read_and_blank_is_ignored() {
    let mut map = HashMap::new();
    map.insert("GEMINI_API_KEY", "secret-key");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.gemini_api_key.as_deref(), Some("secret-key"));

    map.insert("GEMINI_API_KEY", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.gemini_api_key.is_none());
}

#[test]
fn debug_output_redacts_api_key() {
    let mut map = HashMap::new();
    map.insert("GEMINI_API_KEY", "secret-key");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("secret-key"));
    assert!(rendered.contains("[redacted]"));
}

#[test]
fn fetch_timeout_override() {
    let mut map = HashMap::new();
    map.insert("PRODLENS_FETCH_TIMEOUT_SECS", "60");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.fetch_timeout_secs, 60);
}

#[test]
fn fetch_timeout_invalid() {
    let mut map = HashMap::new();
    map.insert("PRODLENS_FETCH_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRODLENS_FETCH_TIMEOUT_SECS"),
        "expected InvalidEnvVar(PRODLENS_FETCH_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn search_max_concurrency_override() {
    let mut map = HashMap::new();
    map.insert("PRODLENS_SEARCH_MAX_CONCURRENCY", "8");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.search_max_concurrency, 8);
}

#[test]
fn search_max_candidates_invalid() {
    let mut map = HashMap::new();
    map.insert("PRODLENS_SEARCH_MAX_CANDIDATES_PER_SITE", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRODLENS_SEARCH_MAX_CANDIDATES_PER_SITE"),
        "expected InvalidEnvVar(PRODLENS_SEARCH_MAX_CANDIDATES_PER_SITE), got: {result:?}"
    );
}

#[test]
fn rank_weight_override() {
    let mut map = HashMap::new();
    map.insert("PRODLENS_RANK_PRICE_WEIGHT", "0.5");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!((cfg.rank.price_weight - 0.5).abs() < f64::EPSILON);
    assert!((cfg.rank.title_weight - 0.55).abs() < f64::EPSILON);
}

#[test]
fn rank_weight_rejects_negative() {
    let mut map = HashMap::new();
    map.insert("PRODLENS_RANK_TITLE_WEIGHT", "-0.2");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRODLENS_RANK_TITLE_WEIGHT"),
        "expected InvalidEnvVar(PRODLENS_RANK_TITLE_WEIGHT), got: {result:?}"
    );
}

#[test]
fn price_threshold_must_be_inside_unit_interval() {
    let mut map = HashMap::new();
    map.insert("PRODLENS_RANK_PRICE_THRESHOLD", "1.5");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRODLENS_RANK_PRICE_THRESHOLD"),
        "expected InvalidEnvVar(PRODLENS_RANK_PRICE_THRESHOLD), got: {result:?}"
    );
}

#[test]
fn api_rate_limit_override() {
    let mut map = HashMap::new();
    map.insert("PRODLENS_API_RATE_LIMIT_REQUESTS", "5");
    map.insert("PRODLENS_API_RATE_LIMIT_WINDOW_SECS", "10");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.api_rate_limit_requests, 5);
    assert_eq!(cfg.api_rate_limit_window_secs, 10);
}

#[test]
fn api_rate_limit_rejects_zero_window() {
    let mut map = HashMap::new();
    map.insert("PRODLENS_API_RATE_LIMIT_WINDOW_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRODLENS_API_RATE_LIMIT_WINDOW_SECS"),
        "expected InvalidEnvVar(PRODLENS_API_RATE_LIMIT_WINDOW_SECS), got: {result:?}"
    );
}
