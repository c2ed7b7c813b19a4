//! Default implementation of the `SearchService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::services::cache::ResultCache;
use crate::services::quota::{QuotaDecision, QuotaService};
use crate::services::ranker::DocumentRanker;
use crate::services::search_service::{SearchError, SearchRequest, SearchResponse, SearchService};

pub struct DefaultSearchService {
    quota: Arc<QuotaService>,
    cache: Arc<ResultCache>,
    ranker: Arc<DocumentRanker>,
}

impl DefaultSearchService {
    #[must_use]
    pub const fn new(
        quota: Arc<QuotaService>,
        cache: Arc<ResultCache>,
        ranker: Arc<DocumentRanker>,
    ) -> Self {
        Self {
            quota,
            cache,
            ranker,
        }
    }
}

#[async_trait]
impl SearchService for DefaultSearchService {
    async fn search(&self, request: SearchRequest) -> Result<SearchResponse, SearchError> {
        let decision = self.quota.check_and_record(&request.user_id).await?;
        if let QuotaDecision::Denied { request_count } = decision {
            return Err(SearchError::QuotaExceeded {
                user_id: request.user_id,
                request_count,
            });
        }

        let start = Instant::now();

        if let Some(documents) = self.cache.lookup(&request.query).await? {
            debug!(query = %request.query, "Search served from cache");
            return Ok(SearchResponse {
                cached: true,
                documents,
                inference_time: start.elapsed().as_secs_f64(),
            });
        }

        let documents = self
            .ranker
            .top_k(request.threshold, request.top_k)
            .await?;

        // The ranked result is still returned when the cache write fails.
        if let Err(e) = self.cache.store(&request.query, &documents).await {
            warn!(query = %request.query, error = %e, "Failed to cache search results");
        }

        Ok(SearchResponse {
            cached: false,
            documents,
            inference_time: start.elapsed().as_secs_f64(),
        })
    }
}
