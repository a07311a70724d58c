//! [`RepositorySource`] backed by [`GithubClient`].

use async_trait::async_trait;
use ghtrend_core::{RepositorySource, SearchQuery, SourceError, SourcePage};

use crate::client::GithubClient;
use crate::normalize::normalize_repository;

#[async_trait]
impl RepositorySource for GithubClient {
    async fn search_page(&self, query: &SearchQuery, page: u32) -> Result<SourcePage, SourceError> {
        let result = self.search_repositories(query, page).await?;

        if result.incomplete_results {
            tracing::warn!(
                page,
                total_count = result.total_count,
                "GitHub returned incomplete search results"
            );
        }

        let mut repositories = Vec::with_capacity(result.items.len());
        let mut trailing_error = None;
        for item in result.items {
            match normalize_repository(item) {
                Ok(observation) => repositories.push(observation),
                Err(e) => {
                    tracing::warn!(
                        page,
                        kept = repositories.len(),
                        error = %e,
                        "malformed search hit; cutting page short"
                    );
                    trailing_error = Some(SourceError::from(e));
                    break;
                }
            }
        }

        Ok(SourcePage {
            repositories,
            has_more: result.next_page.is_some(),
            trailing_error,
        })
    }
}
