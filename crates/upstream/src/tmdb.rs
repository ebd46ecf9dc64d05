//! reqwest-backed [`Upstream`] for The Movie Database v3 API.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::{Result, Upstream, UpstreamError, with_credential};

/// Connection settings for [`TmdbClient`].
#[derive(Clone)]
pub struct TmdbConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl TmdbConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.themoviedb.org/3";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates a config pointing at the public API with the default timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for TmdbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// HTTP client for the metadata API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct TmdbClient {
    cfg: TmdbConfig,
    client: reqwest::Client,
}

impl TmdbClient {
    pub fn new(cfg: TmdbConfig) -> Result<Self> {
        if cfg.base_url.trim().is_empty() {
            return Err(UpstreamError::Config("base_url is empty".to_string()));
        }
        if cfg.api_key.trim().is_empty() {
            return Err(UpstreamError::Config("api_key is empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| {
                UpstreamError::Config(format!("failed to build http client: {}", e.without_url()))
            })?;
        Ok(Self { cfg, client })
    }

    fn url_for(&self, path_and_query: &str) -> String {
        let base = self.cfg.base_url.trim_end_matches('/');
        let path = with_credential(path_and_query, &self.cfg.api_key);
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    fn redact(&self, message: String) -> String {
        message.replace(&self.cfg.api_key, "<redacted>")
    }

    async fn send(&self, path_and_query: &str) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(self.url_for(path_and_query))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message: self.redact(status_message(status, &body)),
            });
        }

        serde_json::from_slice(&body).map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    fn transport_error(&self, err: reqwest::Error) -> UpstreamError {
        let message = if err.is_timeout() {
            format!("request timed out after {:?}", self.cfg.timeout)
        } else {
            err.without_url().to_string()
        };
        UpstreamError::Transport(self.redact(message))
    }
}

#[async_trait]
impl Upstream for TmdbClient {
    #[tracing::instrument(skip(self))]
    async fn fetch(&self, path_and_query: &str) -> Result<serde_json::Value> {
        let start = Instant::now();
        let result = self.send(path_and_query).await;

        metrics::histogram!("upstream_request_duration_seconds")
            .record(start.elapsed().as_secs_f64());
        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        metrics::counter!("upstream_requests_total", "outcome" => outcome).increment(1);
        tracing::debug!(outcome, "upstream request finished");

        result
    }
}

/// Picks the API's own `status_message` when the error body carries one.
fn status_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("status_message")
                .and_then(serde_json::Value::as_str)
                .map(String::from)
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown status")
                .to_string()
        })
}
