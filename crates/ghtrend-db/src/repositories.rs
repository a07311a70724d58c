//! Database operations for `repositories`.

use chrono::{DateTime, Utc};
use ghtrend_core::{RepoId, RepositoryIdentity};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `repositories` table.
///
/// `id` is the surrogate key and doubles as first-insertion order; `repo_id`
/// is the GitHub id stored in `github_id`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RepositoryRow {
    pub id: i64,
    pub repo_id: RepoId,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Inserts a repository or refreshes its mutable fields.
///
/// Conflicts on `github_id` update `name`, `full_name`, `description`, `url`,
/// `created_at`, `last_updated_at`, and `last_seen_at` in place; the surrogate
/// `id` and `first_seen_at` never change.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_repository(pool: &PgPool, identity: &RepositoryIdentity) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO repositories \
             (github_id, name, full_name, description, url, created_at, last_updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (github_id) DO UPDATE SET \
             name            = EXCLUDED.name, \
             full_name       = EXCLUDED.full_name, \
             description     = EXCLUDED.description, \
             url             = EXCLUDED.url, \
             created_at      = EXCLUDED.created_at, \
             last_updated_at = EXCLUDED.last_updated_at, \
             last_seen_at    = NOW()",
    )
    .bind(identity.repo_id)
    .bind(&identity.name)
    .bind(&identity.full_name)
    .bind(&identity.description)
    .bind(&identity.url)
    .bind(identity.created_at)
    .bind(identity.last_updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetches a repository by its GitHub id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_repository(pool: &PgPool, repo_id: RepoId) -> Result<Option<RepositoryRow>, DbError> {
    let row = sqlx::query_as::<_, RepositoryRow>(
        "SELECT id, github_id AS repo_id, name, full_name, description, url, \
                created_at, last_updated_at, first_seen_at, last_seen_at \
         FROM repositories \
         WHERE github_id = $1",
    )
    .bind(repo_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
