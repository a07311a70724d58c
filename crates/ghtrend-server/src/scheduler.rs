//! Background collection job.
//!
//! Registers a one-shot job that collects immediately at startup and a
//! repeated job every `interval`. Both go through the collector's
//! single-flight guard, so a tick that lands during a run is skipped.

use std::sync::Arc;
use std::time::Duration;

use ghtrend_collector::{CollectError, Collector, RunOutcome};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

const TRIGGER: &str = "scheduler";

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all scheduled jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, a
/// job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    collector: Arc<Collector>,
    interval: Duration,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let startup = Arc::clone(&collector);
    let job = Job::new_one_shot_async(Duration::ZERO, move |_uuid, _lock| {
        let collector = Arc::clone(&startup);
        Box::pin(async move {
            run_collection_job(&collector).await;
        })
    })?;
    scheduler.add(job).await?;

    let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
        let collector = Arc::clone(&collector);
        Box::pin(async move {
            run_collection_job(&collector).await;
        })
    })?;
    scheduler.add(job).await?;

    scheduler.start().await?;
    tracing::info!(interval_secs = interval.as_secs(), "scheduler: collection job registered");
    Ok(scheduler)
}

pub(crate) async fn run_collection_job(collector: &Collector) {
    tracing::info!("scheduler: starting collection run");
    match collector.run_once(TRIGGER).await {
        Ok(RunOutcome::Completed { processed }) => {
            tracing::info!(processed, "scheduler: collection run complete");
        }
        Ok(RunOutcome::Aborted { processed, error }) => {
            tracing::warn!(processed, error = %error, "scheduler: collection run aborted");
        }
        Err(CollectError::RunInFlight) => {
            tracing::info!("scheduler: previous collection run still in flight; skipping tick");
        }
        Err(e) => {
            tracing::error!(error = %e, "scheduler: collection run failed");
        }
    }
}
