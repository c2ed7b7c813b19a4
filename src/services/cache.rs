use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, info};

use crate::db::{Store, timestamp};
use crate::models::document::Document;

/// Query-result cache backed by the `search_cache` table.
///
/// Keys are raw query strings (no normalization). Writing an existing key
/// replaces its payload and creation time. Entries older than `max_age` are
/// treated as misses until a sweep deletes them.
#[derive(Clone)]
pub struct ResultCache {
    store: Store,
    max_age: chrono::Duration,
}

impl ResultCache {
    #[must_use]
    pub const fn new(store: Store, max_age: chrono::Duration) -> Self {
        Self { store, max_age }
    }

    #[must_use]
    pub const fn max_age(&self) -> chrono::Duration {
        self.max_age
    }

    pub async fn lookup(&self, query: &str) -> Result<Option<Vec<Document>>> {
        let not_before = cutoff_timestamp(self.max_age);

        let Some(json) = self.store.get_cached_search(query, &not_before).await? else {
            metrics::counter!("search_cache_misses_total").increment(1);
            return Ok(None);
        };

        metrics::counter!("search_cache_hits_total").increment(1);
        let documents: Vec<Document> =
            serde_json::from_str(&json).context("Corrupt cached search payload")?;
        Ok(Some(documents))
    }

    pub async fn store(&self, query: &str, documents: &[Document]) -> Result<()> {
        let json = serde_json::to_string(documents)?;
        self.store
            .cache_search(query, &json, &timestamp(Utc::now()))
            .await?;
        debug!(query = %query, count = documents.len(), "Cached search results");
        Ok(())
    }

    /// Deletes every entry created before `now - max_age`.
    pub async fn evict_older_than(&self, max_age: chrono::Duration) -> Result<u64> {
        let cutoff = cutoff_timestamp(max_age);
        let removed = self.store.delete_cache_created_before(&cutoff).await?;

        info!(
            event = "cache_evicted",
            removed,
            cutoff = %cutoff,
            "Evicted stale search cache entries"
        );
        Ok(removed)
    }

    /// Sweep using the configured max age.
    pub async fn evict_expired(&self) -> Result<u64> {
        self.evict_older_than(self.max_age).await
    }
}

fn cutoff_timestamp(max_age: chrono::Duration) -> String {
    Utc::now()
        .checked_sub_signed(max_age)
        .map_or_else(|| "1970-01-01T00:00:00.000000Z".to_string(), timestamp)
}
