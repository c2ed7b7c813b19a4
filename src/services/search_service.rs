//! Domain service for the search flow.
//!
//! A search checks the caller's quota, then the result cache, and only on a
//! miss ranks documents and writes the result back to the cache.

use crate::models::document::Document;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors specific to search operations.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Too many requests")]
    QuotaExceeded { user_id: String, request_count: i32 },

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for SearchError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(format!("{err:#}"))
    }
}

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub user_id: String,
    pub top_k: u64,
    pub threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Whether `documents` came from the result cache.
    pub cached: bool,
    pub documents: Vec<Document>,
    /// Seconds spent on the cache lookup and ranking.
    pub inference_time: f64,
}

#[async_trait::async_trait]
pub trait SearchService: Send + Sync {
    /// Runs one search for `request.user_id`.
    ///
    /// The cache is keyed by the exact query string only, so a hit is served
    /// regardless of `top_k` and `threshold`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::QuotaExceeded`] once the user's cumulative cap is reached.
    /// Returns [`SearchError::Database`] on storage failures.
    async fn search(&self, request: SearchRequest) -> Result<SearchResponse, SearchError>;
}
