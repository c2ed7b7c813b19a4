//! Seed command handler

use crate::config::Config;
use crate::db::Store;
use crate::models::document::sample_documents;

pub async fn cmd_seed(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let inserted = store.add_documents(&sample_documents()).await?;

    println!("✓ Inserted {} sample documents", inserted);
    Ok(())
}
