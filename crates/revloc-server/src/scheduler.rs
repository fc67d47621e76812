//! Background job scheduler.
//!
//! Registers the recurring smart-enrichment pass when `REVLOC_ENRICH_CRON`
//! is configured. Without a schedule no scheduler is started and enrichment
//! runs only on demand.

use std::sync::Arc;

use revloc_engine::{EnrichmentKind, EnrichmentPipeline};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all scheduled jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, the
/// cron expression is rejected, or the scheduler fails to start.
pub async fn build_scheduler(
    pipeline: Arc<EnrichmentPipeline>,
    cron: Option<&str>,
) -> Result<Option<JobScheduler>, JobSchedulerError> {
    let Some(cron) = cron.map(str::trim).filter(|c| !c.is_empty()) else {
        tracing::info!("REVLOC_ENRICH_CRON not set; scheduled enrichment disabled");
        return Ok(None);
    };

    let scheduler = JobScheduler::new().await?;
    register_enrichment_job(&scheduler, pipeline, cron).await?;
    scheduler.start().await?;

    tracing::info!(cron, "scheduled smart enrichment registered");
    Ok(Some(scheduler))
}

/// Register the smart enrichment pass on the given schedule.
///
/// Overlapping runs are harmless: records claimed by a running pass are
/// skipped by the next one.
async fn register_enrichment_job(
    scheduler: &JobScheduler,
    pipeline: Arc<EnrichmentPipeline>,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let pipeline = Arc::clone(&pipeline);

        Box::pin(async move {
            tracing::info!("scheduler: starting smart enrichment run");
            let report = pipeline.run(EnrichmentKind::Smart).await;
            if report.success {
                tracing::info!(message = %report.message, "scheduler: smart enrichment run complete");
            } else {
                tracing::error!(errors = ?report.errors, "scheduler: smart enrichment run failed");
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}
