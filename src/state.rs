use std::sync::Arc;

use crate::clients::page::PageClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    DefaultSearchService, DocumentRanker, IngestionService, QuotaService, ResultCache,
    SearchService,
};

/// Build the HTTP client used for outbound page fetches.
fn build_shared_http_client(
    timeout_seconds: u64,
    user_agent: &str,
) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent(user_agent)
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

/// Components shared by the HTTP layer, the CLI and the startup phase.
///
/// Every component receives its configuration at construction; nothing reads
/// process-wide settings afterwards.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub quota: Arc<QuotaService>,

    pub cache: Arc<ResultCache>,

    pub ranker: Arc<DocumentRanker>,

    pub ingestion: Arc<IngestionService>,

    pub search_service: Arc<dyn SearchService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Self::with_store(config, store)
    }

    pub fn with_store(config: Config, store: Store) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(
            config.ingestion.request_timeout_seconds.into(),
            &config.ingestion.user_agent,
        )?;

        let quota = Arc::new(QuotaService::new(store.clone(), config.quota.max_requests));
        let cache = Arc::new(ResultCache::new(store.clone(), config.cache.max_age()));
        let ranker = Arc::new(DocumentRanker::new(store.clone()));

        let ingestion = Arc::new(IngestionService::new(
            store.clone(),
            PageClient::with_shared_client(http_client),
            &config.ingestion,
        )?);

        let search_service = Arc::new(DefaultSearchService::new(
            quota.clone(),
            cache.clone(),
            ranker.clone(),
        )) as Arc<dyn SearchService>;

        Ok(Self {
            config: Arc::new(config),
            store,
            quota,
            cache,
            ranker,
            ingestion,
            search_service,
        })
    }
}
