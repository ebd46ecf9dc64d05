//! HTTP proxy for the movie metadata API plus a small preference store.
//!
//! Provides REST endpoints for movie rows, search and details (forwarded
//! to the upstream API) and per-client zip codes, with cross-origin
//! admission control, structured logging (tracing) and Prometheus metrics.

pub mod access;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::{Router, middleware};
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::trace::TraceLayer;
use upstream::Upstream;

use access::AccessPolicy;
use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<U: Upstream + 'static>(
    state: Arc<AppState<U>>,
    metrics_handle: PrometheusHandle,
    policy: AccessPolicy,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::ops::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::ops::health::<U>))
        .route("/api/row/{type}", get(routes::movies::row::<U>))
        .route("/api/search", get(routes::movies::search::<U>))
        .route("/api/movie/{id}", get(routes::movies::detail::<U>))
        .route("/api/zipcode", post(routes::zipcode::set::<U>))
        .route("/api/zipcode/{client_id}", get(routes::zipcode::get::<U>))
        .with_state(state)
        .merge(metrics_router)
        .layer(access::cors_layer(policy.clone()))
        .layer(middleware::from_fn_with_state(policy, access::admit))
        .layer(TraceLayer::new_for_http())
}
