//! Named trending views over a [`SnapshotStore`].
//!
//! The engine only fixes windows and limits; ranking rules live in the store.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use ghtrend_core::{AppConfig, RepoId};

use crate::repositories::RepositoryRow;
use crate::snapshots::SnapshotRow;
use crate::store::SnapshotStore;
use crate::trending::TrendingRow;
use crate::DbError;

const DEFAULT_TRENDING_LIMIT: i64 = 1000;

/// Window sizes and result limit for the trending views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendWindows {
    pub daily: Duration,
    pub weekly: Duration,
    pub history: Duration,
    pub limit: i64,
}

impl Default for TrendWindows {
    fn default() -> Self {
        Self {
            daily: Duration::days(1),
            weekly: Duration::days(7),
            history: Duration::days(90),
            limit: DEFAULT_TRENDING_LIMIT,
        }
    }
}

impl TrendWindows {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            daily: config.daily_window,
            weekly: config.weekly_window,
            history: config.history_window,
            limit: config.trending_limit,
        }
    }
}

/// Start of the window `(start, now]`. A window reaching past the earliest
/// representable instant covers everything.
fn window_start(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// A repository's identity, its newest snapshot, and recent history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryDetail {
    pub repository: RepositoryRow,
    pub latest: SnapshotRow,
    /// Ascending by `collected_at`.
    pub history: Vec<SnapshotRow>,
}

#[derive(Clone)]
pub struct TrendEngine {
    store: Arc<dyn SnapshotStore>,
    windows: TrendWindows,
}

impl std::fmt::Debug for TrendEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrendEngine")
            .field("windows", &self.windows)
            .finish_non_exhaustive()
    }
}

impl TrendEngine {
    #[must_use]
    pub fn new(store: Arc<dyn SnapshotStore>, windows: TrendWindows) -> Self {
        Self { store, windows }
    }

    #[must_use]
    pub fn windows(&self) -> TrendWindows {
        self.windows
    }

    /// Top repositories by stars among those sampled in the daily window.
    ///
    /// # Errors
    ///
    /// Propagates store failures unchanged.
    pub async fn daily_trending(&self) -> Result<Vec<TrendingRow>, DbError> {
        self.daily_trending_at(Utc::now()).await
    }

    /// [`Self::daily_trending`] evaluated as of `now`.
    ///
    /// # Errors
    ///
    /// Propagates store failures unchanged.
    pub async fn daily_trending_at(&self, now: DateTime<Utc>) -> Result<Vec<TrendingRow>, DbError> {
        self.store
            .top_by_latest_stat(window_start(now, self.windows.daily), self.windows.limit)
            .await
    }

    /// Top repositories by star growth inside the weekly window.
    ///
    /// # Errors
    ///
    /// Propagates store failures unchanged.
    pub async fn weekly_trending(&self) -> Result<Vec<TrendingRow>, DbError> {
        self.weekly_trending_at(Utc::now()).await
    }

    /// # Errors
    ///
    /// Propagates store failures unchanged.
    pub async fn weekly_trending_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<TrendingRow>, DbError> {
        self.store
            .top_by_growth(window_start(now, self.windows.weekly), self.windows.limit)
            .await
    }

    /// Latest snapshot plus history-window samples for one repository.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] if the repository has never been
    /// observed or has no snapshot yet. Store failures propagate unchanged.
    pub async fn repository_detail(&self, repo_id: RepoId) -> Result<RepositoryDetail, DbError> {
        self.repository_detail_at(repo_id, Utc::now()).await
    }

    /// # Errors
    ///
    /// See [`Self::repository_detail`].
    pub async fn repository_detail_at(
        &self,
        repo_id: RepoId,
        now: DateTime<Utc>,
    ) -> Result<RepositoryDetail, DbError> {
        let latest = self
            .store
            .latest_snapshot(repo_id)
            .await?
            .ok_or(DbError::NotFound)?;
        let repository = self
            .store
            .get_repository(repo_id)
            .await?
            .ok_or(DbError::NotFound)?;
        let history = self
            .store
            .snapshots_since(repo_id, window_start(now, self.windows.history))
            .await?;

        Ok(RepositoryDetail {
            repository,
            latest,
            history,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use ghtrend_core::{RepositoryIdentity, RepositoryStats};

    use super::*;
    use crate::MemorySnapshotStore;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 10, 8, 0, 0).unwrap()
    }

    fn identity(repo_id: RepoId, name: &str) -> RepositoryIdentity {
        RepositoryIdentity {
            repo_id,
            name: name.to_string(),
            full_name: format!("acme/{name}"),
            description: None,
            url: format!("https://github.com/acme/{name}"),
            created_at: now() - Duration::days(400),
            last_updated_at: now() - Duration::days(1),
        }
    }

    async fn observe(store: &MemorySnapshotStore, repo_id: RepoId, name: &str) {
        store.upsert_repository(&identity(repo_id, name)).await.unwrap();
    }

    async fn sample(store: &MemorySnapshotStore, repo_id: RepoId, stars: i64, at: DateTime<Utc>) {
        let stats = RepositoryStats {
            stars,
            forks: 3,
            watchers: stars,
        };
        store.append_snapshot(repo_id, &stats, at).await.unwrap();
    }

    fn engine(store: Arc<MemorySnapshotStore>) -> TrendEngine {
        TrendEngine::new(store, TrendWindows::default())
    }

    #[tokio::test]
    async fn two_fresh_repositories_rank_by_stars_daily_and_tie_weekly() {
        let store = Arc::new(MemorySnapshotStore::new());
        observe(&store, 1, "a").await;
        observe(&store, 2, "b").await;
        sample(&store, 1, 500, now() - Duration::hours(2)).await;
        sample(&store, 2, 300, now() - Duration::hours(2)).await;
        let engine = engine(store);

        let daily = engine.daily_trending_at(now()).await.unwrap();
        let names: Vec<&str> = daily.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);

        let weekly = engine.weekly_trending_at(now()).await.unwrap();
        let ranked: Vec<(&str, Option<i64>)> = weekly
            .iter()
            .map(|r| (r.name.as_str(), r.growth))
            .collect();
        assert_eq!(ranked, [("a", Some(0)), ("b", Some(0))]);
    }

    #[tokio::test]
    async fn daily_excludes_repositories_not_sampled_in_window() {
        let store = Arc::new(MemorySnapshotStore::new());
        observe(&store, 1, "stale").await;
        observe(&store, 2, "fresh").await;
        sample(&store, 1, 90_000, now() - Duration::hours(30)).await;
        sample(&store, 2, 1_200, now() - Duration::hours(3)).await;

        let daily = engine(store).daily_trending_at(now()).await.unwrap();
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].repo_id, 2);
    }

    #[tokio::test]
    async fn weekly_ranks_by_growth_not_by_stars() {
        let store = Arc::new(MemorySnapshotStore::new());
        observe(&store, 1, "giant").await;
        observe(&store, 2, "rising").await;
        sample(&store, 1, 200_000, now() - Duration::days(6)).await;
        sample(&store, 1, 200_050, now() - Duration::hours(1)).await;
        sample(&store, 2, 1_000, now() - Duration::days(6)).await;
        sample(&store, 2, 4_000, now() - Duration::hours(1)).await;

        let weekly = engine(store).weekly_trending_at(now()).await.unwrap();
        assert_eq!(weekly[0].repo_id, 2);
        assert_eq!(weekly[0].growth, Some(3_000));
        assert_eq!(weekly[1].growth, Some(50));
    }

    #[tokio::test]
    async fn limit_caps_results() {
        let store = Arc::new(MemorySnapshotStore::new());
        for id in 1..=5 {
            observe(&store, id, &format!("r{id}")).await;
            sample(&store, id, 1_000 * id, now() - Duration::hours(1)).await;
        }
        let windows = TrendWindows {
            limit: 3,
            ..TrendWindows::default()
        };

        let daily = TrendEngine::new(store, windows)
            .daily_trending_at(now())
            .await
            .unwrap();
        let ids: Vec<RepoId> = daily.iter().map(|r| r.repo_id).collect();
        assert_eq!(ids, [5, 4, 3]);
    }

    #[tokio::test]
    async fn detail_for_unobserved_repository_is_not_found() {
        let store = Arc::new(MemorySnapshotStore::new());
        let err = engine(store).repository_detail_at(404, now()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[tokio::test]
    async fn detail_without_snapshot_is_not_found() {
        let store = Arc::new(MemorySnapshotStore::new());
        observe(&store, 7, "empty").await;
        let err = engine(store).repository_detail_at(7, now()).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[tokio::test]
    async fn detail_history_is_limited_to_history_window() {
        let store = Arc::new(MemorySnapshotStore::new());
        observe(&store, 1, "a").await;
        sample(&store, 1, 10, now() - Duration::days(120)).await;
        sample(&store, 1, 20, now() - Duration::days(60)).await;
        sample(&store, 1, 30, now() - Duration::days(1)).await;

        let detail = engine(store).repository_detail_at(1, now()).await.unwrap();
        assert_eq!(detail.repository.full_name, "acme/a");
        assert_eq!(detail.latest.stars, 30);
        let stars: Vec<i64> = detail.history.iter().map(|s| s.stars).collect();
        assert_eq!(stars, [20, 30]);
    }

    #[tokio::test]
    async fn windows_wider_than_the_calendar_cover_every_snapshot() {
        let store = Arc::new(MemorySnapshotStore::new());
        observe(&store, 1, "ancient").await;
        sample(&store, 1, 10, now() - Duration::days(3_000)).await;
        sample(&store, 1, 40, now() - Duration::hours(1)).await;
        let huge = Duration::days(1_000_000_000);
        let windows = TrendWindows {
            daily: huge,
            weekly: huge,
            history: huge,
            ..TrendWindows::default()
        };
        let engine = TrendEngine::new(store, windows);

        let daily = engine.daily_trending_at(now()).await.unwrap();
        assert_eq!(daily[0].stars, 40);
        let weekly = engine.weekly_trending_at(now()).await.unwrap();
        assert_eq!(weekly[0].growth, Some(30));
        let detail = engine.repository_detail_at(1, now()).await.unwrap();
        assert_eq!(detail.history.len(), 2);
    }

    #[tokio::test]
    async fn detail_latest_survives_an_empty_history_window() {
        let store = Arc::new(MemorySnapshotStore::new());
        observe(&store, 1, "dormant").await;
        sample(&store, 1, 10, now() - Duration::days(200)).await;

        let detail = engine(store).repository_detail_at(1, now()).await.unwrap();
        assert_eq!(detail.latest.stars, 10);
        assert!(detail.history.is_empty());
    }
}
