//! HTTP request handlers

use super::state::AppState;
use crate::providers::{ContentItem, SearchContext, SearchKind};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Query parameters for page detection
#[derive(Debug, Deserialize)]
pub struct DetectParams {
    /// Page URL
    pub url: Option<String>,
    /// `1` to pick, crop and store the best image; otherwise only list images
    pub best: Option<String>,
}

impl DetectParams {
    fn select_best(&self) -> bool {
        matches!(self.best.as_deref(), Some("1") | Some("true"))
    }
}

/// Query parameters for search
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Search query
    pub q: Option<String>,
    /// Search kind: items, video, audio or event
    pub kind: Option<String>,
    /// Profile the search runs for
    pub pid: Option<String>,
}

/// Search response body
#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub results: Vec<ContentItem>,
}

fn error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// Page detection handler
pub async fn detect(State(state): State<AppState>, Query(params): Query<DetectParams>) -> Response {
    let select_best = params.select_best();
    let url = match params.url {
        Some(url) if !url.trim().is_empty() => url,
        _ => return error(StatusCode::BAD_REQUEST, "missing url"),
    };

    match state.detector.detect(&url, select_best).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            tracing::warn!("Detection failed for {}: {}", url, e);
            error(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

/// Search handler
pub async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let kind: SearchKind = match params.kind.as_deref().unwrap_or("").parse() {
        Ok(kind) => kind,
        Err(e) => return error(StatusCode::BAD_REQUEST, format!("{}", e)),
    };

    let query = params.q.unwrap_or_default();
    let ctx = SearchContext::new(params.pid.unwrap_or_default());

    let results = state.search.search(kind, &query, &ctx).await;
    Json(SearchResults { results }).into_response()
}

/// Cached item lookup handler
pub async fn item(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.search.item(&id).await {
        Some(item) => Json(item).into_response(),
        None => error(StatusCode::NOT_FOUND, "unknown or expired item"),
    }
}

/// Registered providers handler
pub async fn providers(State(state): State<AppState>) -> impl IntoResponse {
    Json(
        state
            .registry
            .names()
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>(),
    )
}

/// Health check handler
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION
    }))
}
