//! Cache sweep command handler

use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_sweep_cache(config: Config, max_age_hours: Option<u32>) -> anyhow::Result<()> {
    let max_age = max_age_hours.map_or_else(
        || config.cache.max_age(),
        |hours| chrono::Duration::hours(i64::from(hours)),
    );

    let state = SharedState::new(config).await?;
    let removed = state.cache.evict_older_than(max_age).await?;
    let remaining = state.store.cache_entry_count().await?;

    println!(
        "✓ Removed {} cached searches older than {}h ({} remaining)",
        removed,
        max_age.num_hours(),
        remaining
    );
    Ok(())
}
