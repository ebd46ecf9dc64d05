//! Application configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use upstream::TmdbConfig;

use crate::access::AccessPolicy;

/// Origins every deployment accepts (local dev servers).
pub const DEFAULT_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:3000"];

/// Suffix allowance used when `CORS_ORIGIN_SUFFIXES` is unset.
pub const DEFAULT_ORIGIN_SUFFIXES: [&str; 1] = [".netlify.app"];

/// Errors that prevent the server from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TMDB_API_KEY is not set")]
    MissingApiKey,
}

/// Server configuration.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `4000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `TMDB_API_KEY` — upstream credential (required)
/// - `TMDB_BASE_URL` — upstream API root
/// - `UPSTREAM_TIMEOUT_MS` — per-request upstream timeout (default: `5000`)
/// - `FRONTEND_URL` — extra allowed origins, comma-separated
/// - `CORS_ORIGIN_SUFFIXES` — allowed origin suffixes, comma-separated
/// - `DATA_FILE` — preference store path (default: `"data.json"`)
#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub tmdb_api_key: String,
    pub tmdb_base_url: String,
    pub upstream_timeout: Duration,
    pub allowed_origins: Vec<String>,
    pub origin_suffixes: Vec<String>,
    pub data_file: PathBuf,
}

impl Config {
    /// Creates a config with defaults for everything but the API key.
    pub fn new(tmdb_api_key: impl Into<String>) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4000,
            log_level: "info".to_string(),
            tmdb_api_key: tmdb_api_key.into(),
            tmdb_base_url: TmdbConfig::DEFAULT_BASE_URL.to_string(),
            upstream_timeout: TmdbConfig::DEFAULT_TIMEOUT,
            allowed_origins: DEFAULT_ORIGINS.iter().map(|s| s.to_string()).collect(),
            origin_suffixes: DEFAULT_ORIGIN_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            data_file: PathBuf::from("data.json"),
        }
    }

    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup("TMDB_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let mut config = Self::new(api_key);

        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.parse().ok()) {
            config.port = port;
        }
        if let Some(level) = lookup("RUST_LOG") {
            config.log_level = level;
        }
        if let Some(url) = lookup("TMDB_BASE_URL").filter(|u| !u.trim().is_empty()) {
            config.tmdb_base_url = url;
        }
        if let Some(ms) = lookup("UPSTREAM_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            config.upstream_timeout = Duration::from_millis(ms);
        }
        if let Some(extra) = lookup("FRONTEND_URL") {
            for origin in split_list(&extra) {
                if !config.allowed_origins.contains(&origin) {
                    config.allowed_origins.push(origin);
                }
            }
        }
        if let Some(suffixes) = lookup("CORS_ORIGIN_SUFFIXES") {
            config.origin_suffixes = split_list(&suffixes);
        }
        if let Some(path) = lookup("DATA_FILE").filter(|p| !p.trim().is_empty()) {
            config.data_file = PathBuf::from(path);
        }

        Ok(config)
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Builds the cross-origin admission policy.
    pub fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::new(self.allowed_origins.clone(), self.origin_suffixes.clone())
    }

    /// Builds the upstream client settings.
    pub fn tmdb_config(&self) -> TmdbConfig {
        TmdbConfig::new(self.tmdb_api_key.clone())
            .with_base_url(self.tmdb_base_url.clone())
            .with_timeout(self.upstream_timeout)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("tmdb_api_key", &"<redacted>")
            .field("tmdb_base_url", &self.tmdb_base_url)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("allowed_origins", &self.allowed_origins)
            .field("origin_suffixes", &self.origin_suffixes)
            .field("data_file", &self.data_file)
            .finish()
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
