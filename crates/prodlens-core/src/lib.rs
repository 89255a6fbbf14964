//! Shared domain types and configuration for prodlens.
//!
//! The scraper, LLM, server, and CLI crates all speak in terms of
//! [`ProductRecord`] and [`ComparisonCandidate`]; this crate owns those types
//! plus the environment-driven [`AppConfig`].

pub mod app_config;
pub mod config;
pub mod products;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, RankSettings};
pub use config::{load_app_config, load_app_config_from_env};
pub use products::{
    Availability, ComparisonCandidate, MatchAttribute, MatchKind, Price, ProductRecord, Site,
    UnknownSiteError,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
