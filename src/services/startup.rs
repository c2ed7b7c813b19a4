//! One-shot initialization run before the server accepts traffic.

use tracing::{error, info};

use crate::state::SharedState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartupReport {
    pub cache_entries_evicted: u64,
    pub documents_ingested: usize,
}

/// Sweeps stale cache entries, then runs the ingestion job when enabled.
///
/// Neither step is fatal: failures are logged and startup continues.
pub async fn initialize(state: &SharedState) -> StartupReport {
    let mut report = StartupReport::default();

    match state.cache.evict_expired().await {
        Ok(removed) => report.cache_entries_evicted = removed,
        Err(e) => error!(error = %e, "Startup cache sweep failed"),
    }

    if state.config.ingestion.run_on_startup {
        report.documents_ingested = state.ingestion.run().await;
    } else {
        info!("Startup ingestion disabled");
    }

    info!(
        event = "startup_complete",
        cache_entries_evicted = report.cache_entries_evicted,
        documents_ingested = report.documents_ingested,
        "Initialization finished"
    );
    report
}
