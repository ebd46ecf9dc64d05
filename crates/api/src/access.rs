//! Cross-origin admission control.
//!
//! [`admit`] runs before routing and turns away requests whose `Origin` the
//! policy rejects, so no handler, upstream call or store write happens for
//! them. [`cors_layer`] adds the permissive response headers for admitted
//! origins. Requests without an `Origin` header (curl, server-to-server,
//! native apps) are always admitted.

use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Returns true if `origin` may receive a cross-origin response.
///
/// Checks, in order: absent origin, exact allow-list match, suffix match.
pub fn is_origin_allowed(origin: Option<&str>, allowed: &[String], suffixes: &[String]) -> bool {
    let Some(origin) = origin else {
        return true;
    };
    if allowed.iter().any(|a| a == origin) {
        return true;
    }
    suffixes
        .iter()
        .any(|suffix| !suffix.is_empty() && origin.ends_with(suffix.as_str()))
}

/// Configured allow-list and suffix allowances.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    allowed_origins: Vec<String>,
    origin_suffixes: Vec<String>,
}

impl AccessPolicy {
    pub fn new(allowed_origins: Vec<String>, origin_suffixes: Vec<String>) -> Self {
        Self {
            allowed_origins,
            origin_suffixes,
        }
    }

    /// Evaluates [`is_origin_allowed`] against this policy.
    pub fn allows(&self, origin: Option<&str>) -> bool {
        is_origin_allowed(origin, &self.allowed_origins, &self.origin_suffixes)
    }

    pub fn allowed_origins(&self) -> &[String] {
        &self.allowed_origins
    }

    pub fn origin_suffixes(&self) -> &[String] {
        &self.origin_suffixes
    }
}

/// Body text for requests turned away by [`admit`].
pub const ORIGIN_REJECTED: &str = "Not allowed by CORS";

fn origin_allowed(policy: &AccessPolicy, origin: Option<&HeaderValue>) -> bool {
    match origin {
        None => policy.allows(None),
        // Non-UTF-8 origins can't match any configured string.
        Some(value) => value.to_str().is_ok_and(|o| policy.allows(Some(o))),
    }
}

/// Middleware rejecting disallowed origins before the router runs.
///
/// Preflights are rejected too. The response carries no CORS headers.
pub async fn admit(State(policy): State<AccessPolicy>, request: Request, next: Next) -> Response {
    let origin = request.headers().get(header::ORIGIN);
    if origin_allowed(&policy, origin) {
        return next.run(request).await;
    }

    metrics::counter!("cors_rejections_total").increment(1);
    tracing::warn!(origin = ?origin, method = %request.method(), "blocked by CORS");
    (
        StatusCode::FORBIDDEN,
        Json(serde_json::json!({ "error": ORIGIN_REJECTED })),
    )
        .into_response()
}

/// Builds the CORS layer granting headers to origins `policy` admits.
pub fn cors_layer(policy: AccessPolicy) -> CorsLayer {
    let policy = Arc::new(policy);
    let allow_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _parts| {
        origin_allowed(&policy, Some(origin))
    });

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(false)
        .max_age(Duration::from_secs(60 * 10))
}
