use reqwest::header::HeaderValue;

use super::*;

fn query() -> SearchQuery {
    SearchQuery {
        min_stars: 1000,
        per_page: 100,
    }
}

#[test]
fn search_url_carries_query_sort_and_paging() {
    let client = GithubClient::with_base_url(None, 5, "test", "https://ghe.example.com/api/v3")
        .expect("client");
    let url = client.search_url(&query(), 3).expect("url");

    assert_eq!(url.path(), "/api/v3/search/repositories");
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert_eq!(
        pairs,
        [
            ("q".to_string(), "stars:>1000".to_string()),
            ("sort".to_string(), "stars".to_string()),
            ("order".to_string(), "desc".to_string()),
            ("per_page".to_string(), "100".to_string()),
            ("page".to_string(), "3".to_string()),
        ]
    );
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = GithubClient::with_base_url(None, 5, "test", "not a url").unwrap_err();
    assert!(matches!(err, GithubError::InvalidBaseUrl { .. }));
}

#[test]
fn empty_token_is_treated_as_anonymous() {
    let client = GithubClient::with_base_url(Some(""), 5, "test", "http://localhost").unwrap();
    assert!(client.token.is_none());
}

#[test]
fn debug_redacts_token() {
    let client =
        GithubClient::with_base_url(Some("ghp_secret"), 5, "test", "http://localhost").unwrap();
    let rendered = format!("{client:?}");
    assert!(!rendered.contains("ghp_secret"));
}

#[test]
fn forbidden_without_budget_headers_is_not_rate_limited() {
    assert!(!is_rate_limited(StatusCode::FORBIDDEN, &HeaderMap::new()));
}

#[test]
fn forbidden_with_exhausted_budget_is_rate_limited() {
    let mut headers = HeaderMap::new();
    headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
    assert!(is_rate_limited(StatusCode::FORBIDDEN, &headers));
}

#[test]
fn retry_after_header_wins_over_reset() {
    let mut headers = HeaderMap::new();
    headers.insert(RETRY_AFTER, HeaderValue::from_static("17"));
    headers.insert("x-ratelimit-reset", HeaderValue::from_static("1"));
    assert_eq!(retry_after_secs(&headers), 17);
}

#[test]
fn reset_in_the_past_means_retry_now() {
    let mut headers = HeaderMap::new();
    headers.insert("x-ratelimit-reset", HeaderValue::from_static("1"));
    assert_eq!(retry_after_secs(&headers), 0);
}

#[test]
fn missing_hints_fall_back_to_default() {
    assert_eq!(retry_after_secs(&HeaderMap::new()), DEFAULT_RETRY_AFTER_SECS);
}
