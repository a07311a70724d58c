//! Ranked read queries over `repositories` joined with `repository_stats`.
//!
//! Both rankings break ties on `repositories.id ASC`, i.e. the order in
//! which repositories were first observed.

use chrono::{DateTime, Utc};
use ghtrend_core::RepoId;
use sqlx::PgPool;

use crate::DbError;

/// One ranked repository with the stat values to display.
///
/// `growth` is only populated by [`top_by_growth`].
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TrendingRow {
    pub repo_id: RepoId,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub url: String,
    pub stars: i64,
    pub forks: i64,
    pub watchers: i64,
    pub collected_at: DateTime<Utc>,
    pub growth: Option<i64>,
}

/// Ranks repositories by the star count of their most recent snapshot inside
/// the window `(since, now]`.
///
/// Repositories with no snapshot in the window are excluded.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn top_by_latest_stat(
    pool: &PgPool,
    since: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<TrendingRow>, DbError> {
    let rows = sqlx::query_as::<_, TrendingRow>(
        "WITH latest AS ( \
             SELECT DISTINCT ON (repository_id) \
                    repository_id, stars, forks, watchers, collected_at \
             FROM repository_stats \
             WHERE collected_at > $1 \
             ORDER BY repository_id, collected_at DESC, id DESC \
         ) \
         SELECT r.github_id AS repo_id, r.name, r.full_name, r.description, r.url, \
                l.stars, l.forks, l.watchers, l.collected_at, \
                NULL::BIGINT AS growth \
         FROM latest l \
         JOIN repositories r ON r.github_id = l.repository_id \
         ORDER BY l.stars DESC, r.id ASC \
         LIMIT $2",
    )
    .bind(since)
    .bind(limit.max(0))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Ranks repositories by `max(stars) - min(stars)` over their snapshots in
/// the window `(since, now]`.
///
/// The displayed stats come from each repository's most recent snapshot
/// overall, not only the ones inside the window. Max-minus-min is tolerant of
/// missing or out-of-order samples, but overstates growth for a repository
/// whose star count dipped inside the window.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn top_by_growth(
    pool: &PgPool,
    since: DateTime<Utc>,
    limit: i64,
) -> Result<Vec<TrendingRow>, DbError> {
    let rows = sqlx::query_as::<_, TrendingRow>(
        "WITH growth AS ( \
             SELECT repository_id, MAX(stars) - MIN(stars) AS growth \
             FROM repository_stats \
             WHERE collected_at > $1 \
             GROUP BY repository_id \
         ), \
         latest AS ( \
             SELECT DISTINCT ON (s.repository_id) \
                    s.repository_id, s.stars, s.forks, s.watchers, s.collected_at \
             FROM repository_stats s \
             JOIN growth g ON g.repository_id = s.repository_id \
             ORDER BY s.repository_id, s.collected_at DESC, s.id DESC \
         ) \
         SELECT r.github_id AS repo_id, r.name, r.full_name, r.description, r.url, \
                l.stars, l.forks, l.watchers, l.collected_at, \
                g.growth \
         FROM growth g \
         JOIN latest l ON l.repository_id = g.repository_id \
         JOIN repositories r ON r.github_id = g.repository_id \
         ORDER BY g.growth DESC, r.id ASC \
         LIMIT $2",
    )
    .bind(since)
    .bind(limit.max(0))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
