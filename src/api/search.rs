use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{
    validate_search_query, validate_threshold, validate_top_k, validate_user_id,
};
use super::{ApiError, ApiResponse, AppState};
use crate::services::{SearchRequest, SearchResponse};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub top_k: Option<i64>,
    pub threshold: Option<f64>,
    pub user_id: Option<String>,
}

/// `GET /search?query=&user_id=&top_k=&threshold=`
pub async fn search(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<SearchResponse>>, ApiError> {
    let Query(params) = params?;
    let defaults = &state.config().search;

    let request = SearchRequest {
        query: validate_search_query(params.query.as_deref())?.to_string(),
        user_id: validate_user_id(params.user_id.as_deref())?.to_string(),
        top_k: validate_top_k(params.top_k, defaults.default_top_k, defaults.max_top_k)?,
        threshold: validate_threshold(params.threshold, defaults.default_threshold)?,
    };

    tracing::Span::current().record("user_id", request.user_id.as_str());

    let response = state.search_service().search(request).await?;

    Ok(Json(ApiResponse::success(response)))
}
