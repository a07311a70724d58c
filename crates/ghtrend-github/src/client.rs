//! HTTP client for the GitHub repository search API.
//!
//! One request per call and no retries: a failed page surfaces as a typed
//! error and the caller decides whether to abort.

use std::time::Duration;

use chrono::Utc;
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, LINK, RETRY_AFTER};
use reqwest::{Client, StatusCode, Url};

use ghtrend_core::{AppConfig, SearchQuery};

use crate::error::GithubError;
use crate::pagination::extract_next_page;
use crate::types::{GithubRepository, SearchResponse};

const DEFAULT_BASE_URL: &str = "https://api.github.com/";
const API_VERSION: &str = "2022-11-28";
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// One page of raw search hits plus the page number that follows it.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub items: Vec<GithubRepository>,
    pub total_count: u64,
    pub incomplete_results: bool,
    /// `None` on the last page.
    pub next_page: Option<u32>,
}

/// Client for `GET /search/repositories`.
///
/// Use [`GithubClient::new`] for production or [`GithubClient::with_base_url`]
/// to point at a mock server in tests.
pub struct GithubClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[redacted]"))
            .finish_non_exhaustive()
    }
}

impl GithubClient {
    /// Creates a client pointed at `api.github.com`.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        token: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, GithubError> {
        Self::with_base_url(token, timeout_secs, user_agent, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (GitHub Enterprise, or a
    /// wiremock server in tests).
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`GithubError::InvalidBaseUrl`] if `base_url` does
    /// not parse.
    pub fn with_base_url(
        token: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
        base_url: &str,
    ) -> Result<Self, GithubError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Trailing slash so that `join` appends instead of replacing the last
        // path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GithubError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            token: token.filter(|t| !t.is_empty()).map(str::to_owned),
        })
    }

    /// Builds a client from the GitHub settings in [`AppConfig`].
    ///
    /// # Errors
    ///
    /// See [`GithubClient::with_base_url`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, GithubError> {
        Self::with_base_url(
            config.github_token.as_deref(),
            config.http_timeout_secs,
            &config.user_agent,
            &config.github_api_url,
        )
    }

    /// Fetches one page of repositories with more than `query.min_stars`
    /// stars, most-starred first.
    ///
    /// # Errors
    ///
    /// - [`GithubError::RateLimited`] on HTTP 429, or 403 with an exhausted
    ///   rate-limit budget.
    /// - [`GithubError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`GithubError::Http`] on network or TLS failure.
    /// - [`GithubError::Deserialize`] if the body is not a search response.
    pub async fn search_repositories(
        &self,
        query: &SearchQuery,
        page: u32,
    ) -> Result<SearchResult, GithubError> {
        let url = self.search_url(query, page)?;

        let mut request = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = request.send().await?;
        let status = response.status();

        if is_rate_limited(status, response.headers()) {
            let retry_after_secs = retry_after_secs(response.headers());
            tracing::warn!(%status, retry_after_secs, page, "GitHub search rate limited");
            return Err(GithubError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            return Err(GithubError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        // Read the Link header before consuming the body.
        let next_page = extract_next_page(
            response
                .headers()
                .get(LINK)
                .and_then(|v| v.to_str().ok()),
        );

        let body = response.text().await?;
        let parsed =
            serde_json::from_str::<SearchResponse>(&body).map_err(|e| GithubError::Deserialize {
                context: format!("search page {page}"),
                source: e,
            })?;

        Ok(SearchResult {
            items: parsed.items,
            total_count: parsed.total_count,
            incomplete_results: parsed.incomplete_results,
            next_page,
        })
    }

    fn search_url(&self, query: &SearchQuery, page: u32) -> Result<Url, GithubError> {
        let mut url =
            self.base_url
                .join("search/repositories")
                .map_err(|e| GithubError::InvalidBaseUrl {
                    base_url: self.base_url.to_string(),
                    reason: e.to_string(),
                })?;

        url.query_pairs_mut()
            .append_pair("q", &format!("stars:>{}", query.min_stars))
            .append_pair("sort", "stars")
            .append_pair("order", "desc")
            .append_pair("per_page", &query.per_page.to_string())
            .append_pair("page", &page.to_string());

        Ok(url)
    }
}

/// GitHub signals primary rate limits as 403 with a zero remaining budget,
/// and secondary limits as either 403 or 429.
fn is_rate_limited(status: StatusCode, headers: &HeaderMap) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }
    status == StatusCode::FORBIDDEN
        && (headers.contains_key(RETRY_AFTER)
            || header_str(headers, "x-ratelimit-remaining") == Some("0"))
}

/// Seconds to wait, from `retry-after` or else the `x-ratelimit-reset` epoch.
fn retry_after_secs(headers: &HeaderMap) -> u64 {
    if let Some(secs) = header_str(headers, RETRY_AFTER.as_str()).and_then(|s| s.parse().ok()) {
        return secs;
    }

    header_str(headers, "x-ratelimit-reset")
        .and_then(|s| s.parse::<i64>().ok())
        .map_or(DEFAULT_RETRY_AFTER_SECS, |reset| {
            u64::try_from(reset - Utc::now().timestamp()).unwrap_or(0)
        })
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
