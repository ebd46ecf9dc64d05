//! Per-client zip code preference endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use prefs::PreferenceRecord;
use serde::{Deserialize, Serialize};
use upstream::Upstream;

use super::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetZipRequest {
    pub client_id: Option<String>,
    pub zip: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub entry: Option<PreferenceRecord>,
}

/// POST /api/zipcode — save a client's zip code.
#[tracing::instrument(skip(state, payload))]
pub async fn set<U: Upstream + 'static>(
    State(state): State<Arc<AppState<U>>>,
    payload: Result<Json<SetZipRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, ApiError> {
    let Json(req) = payload?;
    let client_id = req.client_id.unwrap_or_default();
    let zip = req.zip.unwrap_or_default();

    state.prefs.set(&client_id, &zip).await?;
    tracing::info!(client_id = %client_id, "zip code saved");

    Ok(Json(OkResponse { ok: true }))
}

/// GET /api/zipcode/{clientId} — a client's saved zip code, or null.
#[tracing::instrument(skip_all)]
pub async fn get<U: Upstream + 'static>(
    State(state): State<Arc<AppState<U>>>,
    client_id: Result<Path<String>, PathRejection>,
) -> Result<Json<EntryResponse>, ApiError> {
    let Path(client_id) = client_id?;
    Ok(Json(EntryResponse {
        entry: state.prefs.get(&client_id).await,
    }))
}
