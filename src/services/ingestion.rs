use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::clients::page::{FragmentSelector, PageClient};
use crate::config::IngestionConfig;
use crate::db::Store;
use crate::models::document::NewDocument;

/// Scrapes the configured page and appends each fragment as a document.
pub struct IngestionService {
    store: Store,
    client: PageClient,
    target_url: String,
    selector: FragmentSelector,
    default_score: f64,
}

impl IngestionService {
    pub fn new(store: Store, client: PageClient, config: &IngestionConfig) -> Result<Self> {
        Ok(Self {
            store,
            client,
            target_url: config.target_url.clone(),
            selector: FragmentSelector::parse(&config.selector)?,
            default_score: config.default_score,
        })
    }

    #[must_use]
    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    /// Runs one ingestion pass and returns the number of documents added.
    ///
    /// Fetch and storage failures are logged and reported as zero; nothing is
    /// retried. Repeated runs append duplicates.
    pub async fn run(&self) -> usize {
        let start = std::time::Instant::now();
        info!(event = "job_started", job_name = "ingestion", url = %self.target_url, "Starting document ingestion");

        let html = match self.client.fetch(&self.target_url).await {
            Ok(html) => html,
            Err(e) => {
                error!(event = "job_failed", job_name = "ingestion", error = %e, "Failed to fetch ingestion source");
                return 0;
            }
        };

        let added = match self.ingest_html(&html).await {
            Ok(added) => added,
            Err(e) => {
                error!(event = "job_failed", job_name = "ingestion", error = %e, "Failed to store ingested documents");
                return 0;
            }
        };

        info!(
            event = "job_finished",
            job_name = "ingestion",
            added,
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Document ingestion finished"
        );
        added
    }

    /// Extracts fragments from `html` and stores them. No fragments, no writes.
    pub async fn ingest_html(&self, html: &str) -> Result<usize> {
        let fragments = self.selector.extract(html);

        if fragments.is_empty() {
            warn!(url = %self.target_url, "No fragments matched the ingestion selector");
            return Ok(0);
        }

        debug!(?fragments, "Scraped fragments");

        let docs: Vec<NewDocument> = fragments
            .into_iter()
            .map(|content| NewDocument::new(content, self.default_score))
            .collect();

        let added = self.store.add_documents(&docs).await?;
        metrics::counter!("documents_ingested_total").increment(u64::try_from(added).unwrap_or(u64::MAX));
        Ok(added)
    }
}
