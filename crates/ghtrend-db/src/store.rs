//! The snapshot store contract and its Postgres implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ghtrend_core::{RepoId, RepositoryIdentity, RepositoryStats};
use sqlx::PgPool;

use crate::collection_runs::{self, CollectionRunRow, RunStatus};
use crate::repositories::{self, RepositoryRow};
use crate::snapshots::{self, SnapshotRow};
use crate::trending::{self, TrendingRow};
use crate::DbError;

/// Durable time-series storage of repository identities and stat samples.
///
/// Implementations must give read-committed visibility per snapshot: a reader
/// running alongside a collection run sees each appended snapshot either fully
/// or not at all.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Inserts a repository or updates its mutable fields, keyed on `repo_id`.
    async fn upsert_repository(&self, identity: &RepositoryIdentity) -> Result<(), DbError>;

    /// Appends a new snapshot. Fails with [`DbError::UnknownRepository`] when
    /// the repository was never upserted.
    async fn append_snapshot(
        &self,
        repo_id: RepoId,
        stats: &RepositoryStats,
        collected_at: DateTime<Utc>,
    ) -> Result<SnapshotRow, DbError>;

    async fn get_repository(&self, repo_id: RepoId) -> Result<Option<RepositoryRow>, DbError>;

    /// The snapshot with the greatest `collected_at` for `repo_id`.
    async fn latest_snapshot(&self, repo_id: RepoId) -> Result<Option<SnapshotRow>, DbError>;

    /// Snapshots with `collected_at > since`, ascending by `collected_at`.
    async fn snapshots_since(
        &self,
        repo_id: RepoId,
        since: DateTime<Utc>,
    ) -> Result<Vec<SnapshotRow>, DbError>;

    async fn top_by_latest_stat(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<TrendingRow>, DbError>;

    async fn top_by_growth(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<TrendingRow>, DbError>;

    async fn begin_collection_run(&self, trigger_source: &str)
        -> Result<CollectionRunRow, DbError>;

    async fn finish_collection_run(
        &self,
        id: i64,
        status: RunStatus,
        repositories_processed: i32,
        error_message: Option<&str>,
    ) -> Result<(), DbError>;

    async fn list_collection_runs(&self, limit: i64) -> Result<Vec<CollectionRunRow>, DbError>;

    /// Verifies the backing storage is reachable.
    async fn ping(&self) -> Result<(), DbError>;
}

/// [`SnapshotStore`] backed by a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgSnapshotStore {
    pool: PgPool,
}

impl PgSnapshotStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SnapshotStore for PgSnapshotStore {
    async fn upsert_repository(&self, identity: &RepositoryIdentity) -> Result<(), DbError> {
        repositories::upsert_repository(&self.pool, identity).await
    }

    async fn append_snapshot(
        &self,
        repo_id: RepoId,
        stats: &RepositoryStats,
        collected_at: DateTime<Utc>,
    ) -> Result<SnapshotRow, DbError> {
        snapshots::append_snapshot(&self.pool, repo_id, stats, collected_at).await
    }

    async fn get_repository(&self, repo_id: RepoId) -> Result<Option<RepositoryRow>, DbError> {
        repositories::get_repository(&self.pool, repo_id).await
    }

    async fn latest_snapshot(&self, repo_id: RepoId) -> Result<Option<SnapshotRow>, DbError> {
        snapshots::latest_snapshot(&self.pool, repo_id).await
    }

    async fn snapshots_since(
        &self,
        repo_id: RepoId,
        since: DateTime<Utc>,
    ) -> Result<Vec<SnapshotRow>, DbError> {
        snapshots::snapshots_since(&self.pool, repo_id, since).await
    }

    async fn top_by_latest_stat(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<TrendingRow>, DbError> {
        trending::top_by_latest_stat(&self.pool, since, limit).await
    }

    async fn top_by_growth(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<TrendingRow>, DbError> {
        trending::top_by_growth(&self.pool, since, limit).await
    }

    async fn begin_collection_run(
        &self,
        trigger_source: &str,
    ) -> Result<CollectionRunRow, DbError> {
        collection_runs::begin_collection_run(&self.pool, trigger_source).await
    }

    async fn finish_collection_run(
        &self,
        id: i64,
        status: RunStatus,
        repositories_processed: i32,
        error_message: Option<&str>,
    ) -> Result<(), DbError> {
        collection_runs::finish_collection_run(
            &self.pool,
            id,
            status,
            repositories_processed,
            error_message,
        )
        .await
    }

    async fn list_collection_runs(&self, limit: i64) -> Result<Vec<CollectionRunRow>, DbError> {
        collection_runs::list_collection_runs(&self.pool, limit).await
    }

    async fn ping(&self) -> Result<(), DbError> {
        crate::health_check(&self.pool).await
    }
}
