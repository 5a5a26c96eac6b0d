use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use osintviz_core::{
    SearchQuery, SearchRecord, SearchStats, SearchStatus, SearchSummary, SubmittedSearch,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub active_searches: usize,
}

#[derive(Serialize)]
pub struct SubmitSearchResponse {
    pub success: bool,
    #[serde(flatten)]
    pub search: SubmittedSearch,
}

#[derive(Deserialize)]
pub struct ListSearchesQuery {
    /// `all` or one of the search statuses
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct ListSearchesResponse {
    pub searches: Vec<SearchSummary>,
    pub total: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        active_searches: state.tracker.active_count(),
    })
}

pub async fn submit_search(
    State(state): State<AppState>,
    body: Result<Json<SearchQuery>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SubmitSearchResponse>)> {
    let Json(query) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let input = query.sanitize()?;

    // Only valid submissions count against the quota.
    if let Some(limiter) = &state.rate_limiter {
        limiter.check()?;
    }

    let search = state.tracker.submit_input(input);

    Ok((
        StatusCode::CREATED,
        Json(SubmitSearchResponse {
            success: true,
            search,
        }),
    ))
}

pub async fn get_search(
    State(state): State<AppState>,
    Path(search_id): Path<String>,
) -> ApiResult<Json<SearchRecord>> {
    let record = state.tracker.get_status(&search_id)?;
    debug!(search_id = %search_id, status = %record.status, "Search status requested");
    Ok(Json(record))
}

pub async fn list_searches(
    State(state): State<AppState>,
    Query(params): Query<ListSearchesQuery>,
) -> ApiResult<Json<ListSearchesResponse>> {
    let status = match params.status.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(
            raw.parse::<SearchStatus>()
                .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        ),
    };

    let searches = state.tracker.list(status);
    let total = searches.len();
    Ok(Json(ListSearchesResponse { searches, total }))
}

pub async fn search_stats(State(state): State<AppState>) -> Json<SearchStats> {
    Json(state.tracker.stats())
}

pub async fn delete_search(
    State(state): State<AppState>,
    Path(search_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.tracker.remove(&search_id)?;
    Ok(StatusCode::NO_CONTENT)
}
