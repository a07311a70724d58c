use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Stable external identifier of a repository (the GitHub numeric id).
pub type RepoId = i64;

/// Identity and descriptive fields of a repository as observed at the source.
///
/// `repo_id` is the upsert key; every other field is refreshed on each
/// observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryIdentity {
    pub repo_id: RepoId,
    pub name: String,
    /// `owner/name`, e.g. `"rust-lang/rust"`.
    pub full_name: String,
    pub description: Option<String>,
    /// Browser URL of the repository.
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub last_updated_at: DateTime<Utc>,
}

/// One stat sample. All counts are non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryStats {
    pub stars: i64,
    pub forks: i64,
    pub watchers: i64,
}

impl RepositoryStats {
    /// Builds a stat sample, rejecting negative counts.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NegativeStat`] naming the first negative field.
    pub fn new(stars: i64, forks: i64, watchers: i64) -> Result<Self, CoreError> {
        for (field, value) in [("stars", stars), ("forks", forks), ("watchers", watchers)] {
            if value < 0 {
                return Err(CoreError::NegativeStat { field, value });
            }
        }
        Ok(Self {
            stars,
            forks,
            watchers,
        })
    }
}

/// A repository as returned by a [`crate::RepositorySource`]: identity plus
/// its current stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryObservation {
    pub identity: RepositoryIdentity,
    pub stats: RepositoryStats,
}
