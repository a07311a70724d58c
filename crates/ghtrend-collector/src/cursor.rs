use std::collections::VecDeque;

use ghtrend_core::{RepositoryObservation, RepositorySource, SearchQuery, SourceError};

/// Lazily walks a [`RepositorySource`] page by page.
///
/// A page is only requested once every repository from the previous page has
/// been handed out, so nothing is fetched beyond what the caller consumes.
pub struct SourceCursor<'a> {
    source: &'a dyn RepositorySource,
    query: SearchQuery,
    next_page: Option<u32>,
    buffered: VecDeque<RepositoryObservation>,
    /// Error to surface once `buffered` drains.
    pending_error: Option<SourceError>,
}

impl<'a> SourceCursor<'a> {
    #[must_use]
    pub fn new(source: &'a dyn RepositorySource, query: SearchQuery) -> Self {
        Self {
            source,
            query,
            next_page: Some(1),
            buffered: VecDeque::new(),
            pending_error: None,
        }
    }

    /// Returns the next repository, or `None` once the source is exhausted.
    ///
    /// # Errors
    ///
    /// Propagates the source's error for the page that failed. A page cut
    /// short by a bad record first yields the records ahead of it, then the
    /// error. The cursor should not be used afterwards.
    pub async fn next_repository(&mut self) -> Result<Option<RepositoryObservation>, SourceError> {
        loop {
            if let Some(observation) = self.buffered.pop_front() {
                return Ok(Some(observation));
            }
            if let Some(error) = self.pending_error.take() {
                self.next_page = None;
                return Err(error);
            }
            let Some(page) = self.next_page else {
                return Ok(None);
            };

            let result = self.source.search_page(&self.query, page).await?;
            // An empty page ends the walk even if the source claims more.
            self.next_page = if result.has_more
                && !result.repositories.is_empty()
                && result.trailing_error.is_none()
            {
                page.checked_add(1)
            } else {
                None
            };
            self.buffered.extend(result.repositories);
            self.pending_error = result.trailing_error;
        }
    }
}

impl std::fmt::Debug for SourceCursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceCursor")
            .field("query", &self.query)
            .field("next_page", &self.next_page)
            .field("buffered", &self.buffered.len())
            .field("pending_error", &self.pending_error)
            .finish_non_exhaustive()
    }
}
