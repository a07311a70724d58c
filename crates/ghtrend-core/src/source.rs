//! The repository source capability consumed by the collector.
//!
//! Any transport (REST, GraphQL, a fixture file) can back a source as long as
//! it returns repositories above a star threshold, most-starred first, one
//! page at a time.

use async_trait::async_trait;
use thiserror::Error;

use crate::RepositoryObservation;

/// Selection criterion for a collection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchQuery {
    /// Only repositories with strictly more stars than this are returned.
    pub min_stars: u64,
    /// Requested page size.
    pub per_page: u32,
}

/// One page of search results, ordered by descending star count.
#[derive(Debug, Clone, Default)]
pub struct SourcePage {
    pub repositories: Vec<RepositoryObservation>,
    /// `true` when another page follows this one.
    pub has_more: bool,
    /// Set when the page was cut short by a record that could not be read.
    /// `repositories` holds the records ahead of it; nothing after it is
    /// returned.
    pub trailing_error: Option<SourceError>,
}

#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// Transport failure or an unexpected response from the source.
    #[error("repository source unavailable: {0}")]
    Unavailable(String),

    /// The source refused the request because of its rate limit.
    #[error("rate limited by repository source (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    /// The source returned a record that cannot be turned into an observation.
    #[error("malformed repository record: {0}")]
    Malformed(String),
}

/// Searches a code-hosting platform for popular repositories.
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Fetches page `page` (1-based) of repositories matching `query`.
    async fn search_page(&self, query: &SearchQuery, page: u32)
        -> Result<SourcePage, SourceError>;
}
