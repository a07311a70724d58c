use std::sync::Arc;

use ghtrend_collector::RunOutcome;
use ghtrend_core::AppConfig;
use ghtrend_db::SnapshotStore;

const CLI_TRIGGER: &str = "cli";

/// Run a single collection pass and report how many repositories were stored.
///
/// # Errors
///
/// Returns an error if the GitHub client cannot be built, the store fails,
/// or the source aborts the run.
pub(crate) async fn run_collect_once(
    config: &AppConfig,
    store: Arc<dyn SnapshotStore>,
) -> anyhow::Result<()> {
    let collector = super::build_collector(config, store)?;

    match collector.run_once(CLI_TRIGGER).await? {
        RunOutcome::Completed { processed } => {
            println!("collected {processed} repositories");
            Ok(())
        }
        RunOutcome::Aborted { processed, error } => {
            // Snapshots written before the failure are kept.
            anyhow::bail!("collection aborted after {processed} repositories: {error}")
        }
    }
}

/// Collect immediately and then on `COLLECT_INTERVAL_SECS` until Ctrl-C.
pub(crate) async fn run_collect_watch(
    config: &AppConfig,
    store: Arc<dyn SnapshotStore>,
) -> anyhow::Result<()> {
    let collector = super::build_collector(config, store)?;
    tracing::info!(
        interval_secs = config.collect_interval.as_secs(),
        "watching; press Ctrl-C to stop"
    );

    tokio::select! {
        () = collector.run_scheduler(config.collect_interval) => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("interrupted; stopping collection");
        }
    }

    Ok(())
}
