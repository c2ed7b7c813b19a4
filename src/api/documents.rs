use axum::{Json, extract::State};
use std::sync::Arc;
use tracing::info;

use super::{
    ApiError, ApiResponse, AppState, ClearDatabaseResponse, DocumentListResponse, SeedResponse,
};
use crate::models::document::sample_documents;

/// `GET /documents`
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<DocumentListResponse>>, ApiError> {
    let documents = state
        .store()
        .list_documents()
        .await?;

    Ok(Json(ApiResponse::success(DocumentListResponse { documents })))
}

/// `POST /documents/seed`
pub async fn seed_documents(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SeedResponse>>, ApiError> {
    let inserted = state
        .store()
        .add_documents(&sample_documents())
        .await?;

    info!(inserted, "Seeded sample documents");
    Ok(Json(ApiResponse::success(SeedResponse { inserted })))
}

/// `DELETE /clear-database`
///
/// Removes every document and every cached result. Users keep their counters.
pub async fn clear_database(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ClearDatabaseResponse>>, ApiError> {
    let cleared = state
        .store()
        .clear_database()
        .await?;

    info!(
        event = "database_cleared",
        documents = cleared.documents,
        cache_entries = cleared.cache_entries,
        "Database cleared"
    );

    Ok(Json(ApiResponse::success(ClearDatabaseResponse {
        documents_deleted: cleared.documents,
        cache_entries_deleted: cleared.cache_entries,
    })))
}
