//! In-process [`SnapshotStore`] with the same ordering and tie-break rules as
//! the Postgres queries.
//!
//! Used to exercise the collector and trend engine without a database.

use std::cmp::Reverse;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ghtrend_core::{RepoId, RepositoryIdentity, RepositoryStats};
use tokio::sync::RwLock;

use crate::collection_runs::{CollectionRunRow, RunStatus};
use crate::repositories::RepositoryRow;
use crate::snapshots::SnapshotRow;
use crate::store::SnapshotStore;
use crate::trending::TrendingRow;
use crate::DbError;

#[derive(Debug, Default)]
struct State {
    /// Insertion-ordered; `repositories[i].id == i + 1`.
    repositories: Vec<RepositoryRow>,
    index: HashMap<RepoId, usize>,
    snapshots: Vec<SnapshotRow>,
    runs: Vec<CollectionRunRow>,
}

impl State {
    fn repository(&self, repo_id: RepoId) -> Option<&RepositoryRow> {
        self.index.get(&repo_id).map(|&i| &self.repositories[i])
    }

    /// Latest snapshot per repository among `snapshots` accepted by `filter`.
    fn latest_per_repository<F>(&self, filter: F) -> HashMap<RepoId, &SnapshotRow>
    where
        F: Fn(&SnapshotRow) -> bool,
    {
        let mut latest: HashMap<RepoId, &SnapshotRow> = HashMap::new();
        for snapshot in self.snapshots.iter().filter(|&s| filter(s)) {
            latest
                .entry(snapshot.repo_id)
                .and_modify(|current| {
                    if (snapshot.collected_at, snapshot.id) > (current.collected_at, current.id) {
                        *current = snapshot;
                    }
                })
                .or_insert(snapshot);
        }
        latest
    }
}

fn trending_row(repo: &RepositoryRow, snapshot: &SnapshotRow, growth: Option<i64>) -> TrendingRow {
    TrendingRow {
        repo_id: repo.repo_id,
        name: repo.name.clone(),
        full_name: repo.full_name.clone(),
        description: repo.description.clone(),
        url: repo.url.clone(),
        stars: snapshot.stars,
        forks: snapshot.forks,
        watchers: snapshot.watchers,
        collected_at: snapshot.collected_at,
        growth,
    }
}

fn clamp_limit(limit: i64) -> usize {
    usize::try_from(limit.max(0)).unwrap_or(usize::MAX)
}

#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    state: RwLock<State>,
}

impl MemorySnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored snapshots across all repositories.
    pub async fn snapshot_count(&self) -> usize {
        self.state.read().await.snapshots.len()
    }

    /// Number of stored repository rows.
    pub async fn repository_count(&self) -> usize {
        self.state.read().await.repositories.len()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn upsert_repository(&self, identity: &RepositoryIdentity) -> Result<(), DbError> {
        let now = Utc::now();
        let mut state = self.state.write().await;

        if let Some(&i) = state.index.get(&identity.repo_id) {
            let row = &mut state.repositories[i];
            row.name.clone_from(&identity.name);
            row.full_name.clone_from(&identity.full_name);
            row.description.clone_from(&identity.description);
            row.url.clone_from(&identity.url);
            row.created_at = identity.created_at;
            row.last_updated_at = identity.last_updated_at;
            row.last_seen_at = now;
            return Ok(());
        }

        let position = state.repositories.len();
        state.repositories.push(RepositoryRow {
            id: i64::try_from(position).unwrap_or(i64::MAX) + 1,
            repo_id: identity.repo_id,
            name: identity.name.clone(),
            full_name: identity.full_name.clone(),
            description: identity.description.clone(),
            url: identity.url.clone(),
            created_at: identity.created_at,
            last_updated_at: identity.last_updated_at,
            first_seen_at: now,
            last_seen_at: now,
        });
        state.index.insert(identity.repo_id, position);
        Ok(())
    }

    async fn append_snapshot(
        &self,
        repo_id: RepoId,
        stats: &RepositoryStats,
        collected_at: DateTime<Utc>,
    ) -> Result<SnapshotRow, DbError> {
        let mut state = self.state.write().await;
        if !state.index.contains_key(&repo_id) {
            return Err(DbError::UnknownRepository { repo_id });
        }

        let row = SnapshotRow {
            id: i64::try_from(state.snapshots.len()).unwrap_or(i64::MAX) + 1,
            repo_id,
            stars: stats.stars,
            forks: stats.forks,
            watchers: stats.watchers,
            collected_at,
        };
        state.snapshots.push(row.clone());
        Ok(row)
    }

    async fn get_repository(&self, repo_id: RepoId) -> Result<Option<RepositoryRow>, DbError> {
        Ok(self.state.read().await.repository(repo_id).cloned())
    }

    async fn latest_snapshot(&self, repo_id: RepoId) -> Result<Option<SnapshotRow>, DbError> {
        let state = self.state.read().await;
        Ok(state
            .snapshots
            .iter()
            .filter(|s| s.repo_id == repo_id)
            .max_by_key(|s| (s.collected_at, s.id))
            .cloned())
    }

    async fn snapshots_since(
        &self,
        repo_id: RepoId,
        since: DateTime<Utc>,
    ) -> Result<Vec<SnapshotRow>, DbError> {
        let state = self.state.read().await;
        let mut rows: Vec<SnapshotRow> = state
            .snapshots
            .iter()
            .filter(|s| s.repo_id == repo_id && s.collected_at > since)
            .cloned()
            .collect();
        rows.sort_by_key(|s| (s.collected_at, s.id));
        Ok(rows)
    }

    async fn top_by_latest_stat(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<TrendingRow>, DbError> {
        let state = self.state.read().await;
        let latest = state.latest_per_repository(|s| s.collected_at > since);

        let mut ranked: Vec<(&RepositoryRow, &SnapshotRow)> = latest
            .into_iter()
            .filter_map(|(repo_id, snapshot)| state.repository(repo_id).map(|r| (r, snapshot)))
            .collect();
        ranked.sort_by_key(|(repo, snapshot)| (Reverse(snapshot.stars), repo.id));
        ranked.truncate(clamp_limit(limit));

        Ok(ranked
            .into_iter()
            .map(|(repo, snapshot)| trending_row(repo, snapshot, None))
            .collect())
    }

    async fn top_by_growth(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<TrendingRow>, DbError> {
        let state = self.state.read().await;

        let mut bounds: HashMap<RepoId, (i64, i64)> = HashMap::new();
        for snapshot in state.snapshots.iter().filter(|s| s.collected_at > since) {
            bounds
                .entry(snapshot.repo_id)
                .and_modify(|(min, max)| {
                    *min = (*min).min(snapshot.stars);
                    *max = (*max).max(snapshot.stars);
                })
                .or_insert((snapshot.stars, snapshot.stars));
        }

        let latest = state.latest_per_repository(|s| bounds.contains_key(&s.repo_id));

        let mut ranked: Vec<(&RepositoryRow, &SnapshotRow, i64)> = bounds
            .iter()
            .filter_map(|(repo_id, (min, max))| {
                let repo = state.repository(*repo_id)?;
                let snapshot = latest.get(repo_id)?;
                Some((repo, *snapshot, max - min))
            })
            .collect();
        ranked.sort_by_key(|(repo, _, growth)| (Reverse(*growth), repo.id));
        ranked.truncate(clamp_limit(limit));

        Ok(ranked
            .into_iter()
            .map(|(repo, snapshot, growth)| trending_row(repo, snapshot, Some(growth)))
            .collect())
    }

    async fn begin_collection_run(
        &self,
        trigger_source: &str,
    ) -> Result<CollectionRunRow, DbError> {
        let mut state = self.state.write().await;
        let row = CollectionRunRow {
            id: i64::try_from(state.runs.len()).unwrap_or(i64::MAX) + 1,
            trigger_source: trigger_source.to_owned(),
            status: RunStatus::Running.as_str().to_owned(),
            started_at: Utc::now(),
            completed_at: None,
            repositories_processed: 0,
            error_message: None,
        };
        state.runs.push(row.clone());
        Ok(row)
    }

    async fn finish_collection_run(
        &self,
        id: i64,
        status: RunStatus,
        repositories_processed: i32,
        error_message: Option<&str>,
    ) -> Result<(), DbError> {
        let mut state = self.state.write().await;
        let run = state
            .runs
            .iter_mut()
            .find(|r| r.id == id && r.status == RunStatus::Running.as_str())
            .ok_or(DbError::InvalidCollectionRunTransition {
                id,
                expected_status: "running",
            })?;

        run.status = status.as_str().to_owned();
        run.completed_at = Some(Utc::now());
        run.repositories_processed = repositories_processed;
        run.error_message = error_message.map(str::to_owned);
        Ok(())
    }

    async fn list_collection_runs(&self, limit: i64) -> Result<Vec<CollectionRunRow>, DbError> {
        let state = self.state.read().await;
        let mut rows = state.runs.clone();
        rows.sort_by_key(|r| Reverse((r.started_at, r.id)));
        rows.truncate(clamp_limit(limit));
        Ok(rows)
    }

    async fn ping(&self) -> Result<(), DbError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
