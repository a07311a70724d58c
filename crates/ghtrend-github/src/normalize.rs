//! Conversion from raw search hits to [`RepositoryObservation`].

use chrono::{DateTime, Utc};
use ghtrend_core::{RepositoryIdentity, RepositoryObservation, RepositoryStats};

use crate::error::GithubError;
use crate::types::GithubRepository;

/// Normalizes one search hit.
///
/// # Errors
///
/// Returns [`GithubError::Malformed`] if a count or timestamp is missing,
/// a count is negative, or a timestamp is not RFC 3339.
pub fn normalize_repository(repo: GithubRepository) -> Result<RepositoryObservation, GithubError> {
    let repo_id = repo.id;
    let malformed = |reason: String| GithubError::Malformed { repo_id, reason };

    let count = |field: &str, value: Option<i64>| {
        value.ok_or_else(|| malformed(format!("missing {field}")))
    };
    let stars = count("stargazers_count", repo.stargazers_count)?;
    let forks = count("forks_count", repo.forks_count)?;
    let watchers = count("watchers_count", repo.watchers_count)?;
    let stats = RepositoryStats::new(stars, forks, watchers).map_err(|e| malformed(e.to_string()))?;

    let timestamp = |field: &str, value: Option<&str>| {
        let raw = value.ok_or_else(|| malformed(format!("missing {field}")))?;
        DateTime::parse_from_rfc3339(raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| malformed(format!("{field} \"{raw}\": {e}")))
    };
    let created_at = timestamp("created_at", repo.created_at.as_deref())?;
    let last_updated_at = timestamp("updated_at", repo.updated_at.as_deref())?;

    // GitHub sends "" for repositories without a description.
    let description = repo.description.filter(|d| !d.trim().is_empty());

    Ok(RepositoryObservation {
        identity: RepositoryIdentity {
            repo_id,
            name: repo.name,
            full_name: repo.full_name,
            description,
            url: repo.html_url,
            created_at,
            last_updated_at,
        },
        stats,
    })
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
