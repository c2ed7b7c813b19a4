use anyhow::{Context, Result};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::config::CacheConfig;
use crate::services::cache::ResultCache;

/// Checks a cron expression with the same parser the scheduler uses.
/// Expressions carry a leading seconds field, e.g. `0 0 * * * *`.
pub fn validate_cron(expr: &str) -> Result<()> {
    Job::new(expr, |_uuid, _lock| {})
        .map(|_| ())
        .with_context(|| format!("Invalid cron expression: '{expr}'"))
}

/// Optional recurring cache sweep on top of the startup sweep.
pub struct Scheduler {
    cache: Arc<ResultCache>,
    config: CacheConfig,
}

impl Scheduler {
    #[must_use]
    pub const fn new(cache: Arc<ResultCache>, config: CacheConfig) -> Self {
        Self { cache, config }
    }

    /// Starts the sweep job. Returns `None` when no cron expression is configured.
    pub async fn start(&self) -> Result<Option<JobScheduler>> {
        let Some(cron_expr) = self.config.sweep_cron.as_deref() else {
            info!("Recurring cache sweep disabled; cache is swept at startup only");
            return Ok(None);
        };

        let cache = Arc::clone(&self.cache);
        let job = Job::new_async(cron_expr, move |_uuid, _lock| {
            let cache = Arc::clone(&cache);
            Box::pin(async move {
                let start = std::time::Instant::now();
                info!(event = "job_started", job_name = "sweep_cache", "Starting scheduled cache sweep");

                if let Err(e) = cache.evict_expired().await {
                    error!(event = "job_failed", job_name = "sweep_cache", error = %e, "Scheduled cache sweep failed");
                    return;
                }

                info!(
                    event = "job_finished",
                    job_name = "sweep_cache",
                    duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
                    "Scheduled cache sweep finished"
                );
            })
        })?;

        let sched = JobScheduler::new().await?;
        sched.add(job).await?;
        sched.start().await?;

        info!("Cache sweep scheduled with cron: {}", cron_expr);
        Ok(Some(sched))
    }
}
