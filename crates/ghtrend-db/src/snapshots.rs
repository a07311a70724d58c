//! Database operations for `repository_stats`.
//!
//! Rows are append-only: nothing in this crate updates or deletes them.

use chrono::{DateTime, Utc};
use ghtrend_core::{RepoId, RepositoryStats};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `repository_stats` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SnapshotRow {
    pub id: i64,
    pub repo_id: RepoId,
    pub stars: i64,
    pub forks: i64,
    pub watchers: i64,
    pub collected_at: DateTime<Utc>,
}

impl SnapshotRow {
    #[must_use]
    pub fn stats(&self) -> RepositoryStats {
        RepositoryStats {
            stars: self.stars,
            forks: self.forks,
            watchers: self.watchers,
        }
    }
}

/// Appends a stat sample for an existing repository.
///
/// No deduplication is attempted: two samples with identical values and
/// timestamps produce two rows.
///
/// # Errors
///
/// Returns [`DbError::UnknownRepository`] if `repo_id` has no `repositories`
/// row, or [`DbError::Sqlx`] for any other failure.
pub async fn append_snapshot(
    pool: &PgPool,
    repo_id: RepoId,
    stats: &RepositoryStats,
    collected_at: DateTime<Utc>,
) -> Result<SnapshotRow, DbError> {
    let result = sqlx::query_as::<_, SnapshotRow>(
        "INSERT INTO repository_stats (repository_id, stars, forks, watchers, collected_at) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, repository_id AS repo_id, stars, forks, watchers, collected_at",
    )
    .bind(repo_id)
    .bind(stats.stars)
    .bind(stats.forks)
    .bind(stats.watchers)
    .bind(collected_at)
    .fetch_one(pool)
    .await;

    match result {
        Ok(row) => Ok(row),
        Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
            Err(DbError::UnknownRepository { repo_id })
        }
        Err(e) => Err(e.into()),
    }
}

/// Returns the most recent snapshot for a repository, if one exists.
///
/// Ordered by `collected_at DESC, id DESC` so that of two samples sharing a
/// timestamp the later-appended one wins.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_snapshot(pool: &PgPool, repo_id: RepoId) -> Result<Option<SnapshotRow>, DbError> {
    let row = sqlx::query_as::<_, SnapshotRow>(
        "SELECT id, repository_id AS repo_id, stars, forks, watchers, collected_at \
         FROM repository_stats \
         WHERE repository_id = $1 \
         ORDER BY collected_at DESC, id DESC \
         LIMIT 1",
    )
    .bind(repo_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns every snapshot for a repository with `collected_at > since`, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn snapshots_since(
    pool: &PgPool,
    repo_id: RepoId,
    since: DateTime<Utc>,
) -> Result<Vec<SnapshotRow>, DbError> {
    let rows = sqlx::query_as::<_, SnapshotRow>(
        "SELECT id, repository_id AS repo_id, stars, forks, watchers, collected_at \
         FROM repository_stats \
         WHERE repository_id = $1 AND collected_at > $2 \
         ORDER BY collected_at ASC, id ASC",
    )
    .bind(repo_id)
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
