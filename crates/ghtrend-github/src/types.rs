//! Response shapes for `GET /search/repositories`.
//!
//! Only the fields the collector stores are declared; serde ignores the rest.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub total_count: u64,
    /// `true` when GitHub timed out and returned a partial result set.
    #[serde(default)]
    pub incomplete_results: bool,
    pub items: Vec<GithubRepository>,
}

/// One search hit.
///
/// Counts are signed so that a bogus negative value reaches normalization
/// and is reported as malformed instead of failing the whole page.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubRepository {
    pub id: i64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub stargazers_count: Option<i64>,
    pub forks_count: Option<i64>,
    pub watchers_count: Option<i64>,
}
