pub mod cache;
pub use cache::ResultCache;

pub mod ingestion;
pub use ingestion::IngestionService;

pub mod quota;
pub use quota::{QuotaDecision, QuotaService};

pub mod ranker;
pub use ranker::DocumentRanker;

pub mod scheduler;
pub use scheduler::Scheduler;

pub mod search_service;
pub mod search_service_impl;
pub use search_service::{SearchError, SearchRequest, SearchResponse, SearchService};
pub use search_service_impl::DefaultSearchService;

pub mod startup;
pub use startup::{StartupReport, initialize};
