//! Movie rows, search and detail endpoints.
//!
//! Each handler turns its inputs into a credential-free upstream path and
//! forwards the upstream JSON body unchanged.

use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use upstream::Upstream;

use super::AppState;
use crate::error::ApiError;

/// A fixed movie listing shown as a row in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowCategory {
    Trending,
    Popular,
    TopRated,
    NowPlaying,
}

impl RowCategory {
    pub const ALL: [RowCategory; 4] = [
        RowCategory::Trending,
        RowCategory::Popular,
        RowCategory::TopRated,
        RowCategory::NowPlaying,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RowCategory::Trending => "trending",
            RowCategory::Popular => "popular",
            RowCategory::TopRated => "top_rated",
            RowCategory::NowPlaying => "now_playing",
        }
    }

    /// Upstream path for this row at `page`.
    pub fn upstream_path(&self, page: u32) -> String {
        let base = match self {
            RowCategory::Trending => "/trending/movie/week",
            RowCategory::Popular => "/movie/popular",
            RowCategory::TopRated => "/movie/top_rated",
            RowCategory::NowPlaying => "/movie/now_playing",
        };
        format!("{base}?language=en-US&page={page}")
    }
}

impl FromStr for RowCategory {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RowCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ApiError::BadRequest("Unknown row type".to_string()))
    }
}

impl std::fmt::Display for RowCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a 1-based page number; absent or empty means page 1.
pub fn parse_page(raw: Option<&str>) -> Result<u32, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(1),
        Some(s) => s
            .parse::<u32>()
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| ApiError::BadRequest("page must be a positive integer".to_string())),
    }
}

/// Upstream search path; `query` is percent-encoded.
pub fn search_path(query: &str, page: u32) -> String {
    format!(
        "/search/movie?language=en-US&query={}&page={page}&include_adult=false",
        urlencoding::encode(query)
    )
}

/// Upstream detail path including videos and credits.
pub fn movie_path(id: &str) -> Result<String, ApiError> {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::BadRequest("Invalid movie id".to_string()));
    }
    Ok(format!(
        "/movie/{id}?language=en-US&append_to_response=videos,credits"
    ))
}

// -- Request types --

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub page: Option<String>,
}

// -- Handlers --

/// GET /api/row/{type} — one page of a movie row.
#[tracing::instrument(skip_all)]
pub async fn row<U: Upstream + 'static>(
    State(state): State<Arc<AppState<U>>>,
    kind: Result<Path<String>, PathRejection>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Path(kind) = kind?;
    let Query(params) = params?;
    let category: RowCategory = kind.parse()?;
    let page = parse_page(params.page.as_deref())?;
    tracing::debug!(%category, page, "forwarding row");

    let data = state.upstream.fetch(&category.upstream_path(page)).await?;
    Ok(Json(data))
}

/// GET /api/search — free-text movie search.
#[tracing::instrument(skip(state, params))]
pub async fn search<U: Upstream + 'static>(
    State(state): State<Arc<AppState<U>>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Query(params) = params?;
    let query = params.q.as_deref().unwrap_or_default().trim();
    if query.is_empty() {
        return Ok(Json(serde_json::json!({ "results": [] })));
    }
    let page = parse_page(params.page.as_deref())?;

    let data = state.upstream.fetch(&search_path(query, page)).await?;
    Ok(Json(data))
}

/// GET /api/movie/{id} — movie detail with credits and videos.
#[tracing::instrument(skip_all)]
pub async fn detail<U: Upstream + 'static>(
    State(state): State<Arc<AppState<U>>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Path(id) = id?;
    let path = movie_path(&id)?;
    let data = state.upstream.fetch(&path).await?;
    Ok(Json(data))
}
