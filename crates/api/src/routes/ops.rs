//! Health and Prometheus metrics endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use upstream::Upstream;

use super::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub preferences: usize,
}

/// GET /health — liveness plus the number of stored preferences.
pub async fn health<U: Upstream + 'static>(
    State(state): State<Arc<AppState<U>>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        preferences: state.prefs.len().await,
    })
}

/// GET /metrics — Prometheus text exposition.
pub async fn metrics(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        handle.render(),
    )
}
