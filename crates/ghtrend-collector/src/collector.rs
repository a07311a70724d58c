use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use ghtrend_core::{AppConfig, RepositorySource, SearchQuery, SourceError};
use ghtrend_db::{DbError, RunStatus, SnapshotStore};
use thiserror::Error;
use tokio::time::MissedTickBehavior;

use crate::cursor::SourceCursor;
use crate::guard::SingleFlight;
use crate::throttle::Throttle;

const PROGRESS_EVERY: usize = 10;
const SCHEDULER_TRIGGER: &str = "scheduler";

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("snapshot store error: {0}")]
    Store(#[from] DbError),

    #[error("a collection run is already in flight")]
    RunInFlight,
}

/// How a run that was allowed to start ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// The source was exhausted or the batch cap was reached.
    Completed { processed: usize },
    /// The source failed mid-run. Snapshots written before the failure stay
    /// committed.
    Aborted {
        processed: usize,
        error: SourceError,
    },
}

impl RunOutcome {
    #[must_use]
    pub fn processed(&self) -> usize {
        match self {
            RunOutcome::Completed { processed } | RunOutcome::Aborted { processed, .. } => {
                *processed
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectorSettings {
    pub min_stars: u64,
    pub page_size: u32,
    /// Maximum repositories processed per run.
    pub batch_cap: usize,
    /// Minimum spacing between two repository fetches.
    pub fetch_throttle: Duration,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            min_stars: 1000,
            page_size: 100,
            batch_cap: 1000,
            fetch_throttle: Duration::from_secs(1),
        }
    }
}

impl CollectorSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            min_stars: config.min_stars,
            page_size: config.page_size,
            batch_cap: config.batch_cap,
            fetch_throttle: config.fetch_throttle,
        }
    }

    fn query(&self) -> SearchQuery {
        SearchQuery {
            min_stars: self.min_stars,
            per_page: self.page_size,
        }
    }
}

enum Interrupted {
    Source(SourceError),
    Store(DbError),
}

/// Drives collection runs from a [`RepositorySource`] into a [`SnapshotStore`].
///
/// Runs are single-flight: [`Collector::run_once`] refuses to start while
/// another run on the same collector is in progress.
pub struct Collector {
    source: Arc<dyn RepositorySource>,
    store: Arc<dyn SnapshotStore>,
    settings: CollectorSettings,
    flight: SingleFlight,
}

impl std::fmt::Debug for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collector")
            .field("settings", &self.settings)
            .field("flight", &self.flight)
            .finish_non_exhaustive()
    }
}

impl Collector {
    #[must_use]
    pub fn new(
        source: Arc<dyn RepositorySource>,
        store: Arc<dyn SnapshotStore>,
        settings: CollectorSettings,
    ) -> Self {
        Self {
            source,
            store,
            settings,
            flight: SingleFlight::new(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &CollectorSettings {
        &self.settings
    }

    /// `true` while a run is in progress.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.flight.is_busy()
    }

    /// Performs one collection run, starting from the most-starred repository.
    ///
    /// Source failures end the run early and are reported as
    /// [`RunOutcome::Aborted`]; they are never returned as errors.
    ///
    /// # Errors
    ///
    /// - [`CollectError::RunInFlight`] if another run holds the guard.
    /// - [`CollectError::Store`] if writing a repository or snapshot fails.
    pub async fn run_once(&self, trigger: &str) -> Result<RunOutcome, CollectError> {
        let Some(_guard) = self.flight.try_acquire() else {
            tracing::warn!(trigger, "collection run skipped; previous run still in flight");
            return Err(CollectError::RunInFlight);
        };

        let run_id = self.begin_run_best_effort(trigger).await;
        tracing::info!(
            trigger,
            batch_cap = self.settings.batch_cap,
            min_stars = self.settings.min_stars,
            "collection run started"
        );

        let mut processed = 0usize;
        match self.collect(&mut processed).await {
            Ok(()) => {
                tracing::info!(processed, "collection run completed");
                self.finish_run_best_effort(run_id, RunStatus::Succeeded, processed, None)
                    .await;
                Ok(RunOutcome::Completed { processed })
            }
            Err(Interrupted::Source(error)) => {
                tracing::error!(processed, error = %error, "collection run aborted by source error");
                let message = error.to_string();
                self.finish_run_best_effort(run_id, RunStatus::Aborted, processed, Some(&message))
                    .await;
                Ok(RunOutcome::Aborted { processed, error })
            }
            Err(Interrupted::Store(error)) => {
                tracing::error!(processed, error = %error, "collection run failed writing snapshots");
                let message = error.to_string();
                self.finish_run_best_effort(run_id, RunStatus::Failed, processed, Some(&message))
                    .await;
                Err(CollectError::Store(error))
            }
        }
    }

    /// Runs [`Collector::run_once`] immediately, then once per `interval`,
    /// forever.
    ///
    /// Runs never overlap: a run that outlasts `interval` delays the next
    /// one instead of stacking ticks. Errors are logged and do not stop the
    /// loop.
    pub async fn run_scheduler(&self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = self.run_once(SCHEDULER_TRIGGER).await {
                tracing::error!(error = %e, "scheduled collection run failed");
            }
        }
    }

    async fn collect(&self, processed: &mut usize) -> Result<(), Interrupted> {
        let mut cursor = SourceCursor::new(self.source.as_ref(), self.settings.query());
        let mut throttle = Throttle::new(self.settings.fetch_throttle);

        while *processed < self.settings.batch_cap {
            throttle.ready().await;
            let Some(observation) = cursor
                .next_repository()
                .await
                .map_err(Interrupted::Source)?
            else {
                break;
            };

            let collected_at = Utc::now();
            let repo_id = observation.identity.repo_id;
            self.store
                .upsert_repository(&observation.identity)
                .await
                .map_err(Interrupted::Store)?;
            self.store
                .append_snapshot(repo_id, &observation.stats, collected_at)
                .await
                .map_err(Interrupted::Store)?;

            *processed += 1;
            tracing::debug!(repo_id, stars = observation.stats.stars, "snapshot recorded");
            if *processed % PROGRESS_EVERY == 0 {
                tracing::info!(processed = *processed, "collection progress");
            }
        }

        Ok(())
    }

    async fn begin_run_best_effort(&self, trigger: &str) -> Option<i64> {
        match self.store.begin_collection_run(trigger).await {
            Ok(run) => Some(run.id),
            Err(e) => {
                tracing::warn!(error = %e, "failed to record collection run start");
                None
            }
        }
    }

    async fn finish_run_best_effort(
        &self,
        run_id: Option<i64>,
        status: RunStatus,
        processed: usize,
        error_message: Option<&str>,
    ) {
        let Some(run_id) = run_id else {
            return;
        };
        let processed = i32::try_from(processed).unwrap_or(i32::MAX);
        if let Err(e) = self
            .store
            .finish_collection_run(run_id, status, processed, error_message)
            .await
        {
            tracing::warn!(
                run_id,
                status = status.as_str(),
                error = %e,
                "failed to record collection run outcome"
            );
        }
    }
}

#[cfg(test)]
#[path = "collector_test.rs"]
mod tests;
