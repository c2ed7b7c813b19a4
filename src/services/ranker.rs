use anyhow::Result;

use crate::db::Store;
use crate::models::document::Document;

/// Selects the best documents at or above a score threshold.
#[derive(Clone)]
pub struct DocumentRanker {
    store: Store,
}

impl DocumentRanker {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// At most `k` documents with `score >= threshold`, highest score first.
    /// Equal scores keep insertion order.
    pub async fn top_k(&self, threshold: f64, k: u64) -> Result<Vec<Document>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        self.store.top_documents(threshold, k).await
    }
}
