//! Ingest command handler

use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_ingest(config: Config) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;
    let before = state.store.document_count().await?;

    println!("Scraping {}", state.ingestion.target_url());
    let added = state.ingestion.run().await;

    if added == 0 {
        println!("No documents added. Check the logs for details.");
    } else {
        println!("✓ Added {} documents ({} before)", added, before);
    }

    Ok(())
}
