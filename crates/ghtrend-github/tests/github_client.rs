//! Integration tests for `GithubClient` and its `RepositorySource` impl.
//!
//! Uses `wiremock` to stand up a local HTTP server for each test so no
//! real network traffic is made.

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ghtrend_core::{RepositorySource, SearchQuery, SourceError};
use ghtrend_github::{GithubClient, GithubError};

fn test_client(server: &MockServer, token: Option<&str>) -> GithubClient {
    GithubClient::with_base_url(token, 5, "ghtrend-test/0.1", &server.uri())
        .expect("failed to build test GithubClient")
}

fn query() -> SearchQuery {
    SearchQuery {
        min_stars: 1000,
        per_page: 2,
    }
}

fn repo_json(id: i64, full_name: &str, stars: i64) -> serde_json::Value {
    let name = full_name.split('/').nth(1).unwrap_or(full_name);
    json!({
        "id": id,
        "node_id": "MDEwOlJlcG9zaXRvcnkx",
        "name": name,
        "full_name": full_name,
        "private": false,
        "description": "a repository",
        "html_url": format!("https://github.com/{full_name}"),
        "created_at": "2014-06-01T12:00:00Z",
        "updated_at": "2026-02-28T08:15:00Z",
        "stargazers_count": stars,
        "forks_count": stars / 10,
        "watchers_count": stars,
        "language": "Rust"
    })
}

fn page_json(items: &[serde_json::Value]) -> serde_json::Value {
    json!({
        "total_count": 2400,
        "incomplete_results": false,
        "items": items
    })
}

// ---------------------------------------------------------------------------
// Happy paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_sends_expected_query_and_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .and(query_param("q", "stars:>1000"))
        .and(query_param("sort", "stars"))
        .and(query_param("order", "desc"))
        .and(query_param("per_page", "2"))
        .and(query_param("page", "1"))
        .and(header("accept", "application/vnd.github+json"))
        .and(header("authorization", "Bearer ghp_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(&[])))
        .expect(1)
        .mount(&server)
        .await;

    let result = test_client(&server, Some("ghp_test"))
        .search_repositories(&query(), 1)
        .await;

    assert!(result.is_ok(), "expected Ok, got: {result:?}");
}

#[tokio::test]
async fn search_page_normalizes_items_and_follows_next_link() {
    let server = MockServer::start().await;
    let next = format!(
        "<{}/search/repositories?q=stars%3A%3E1000&per_page=2&page=2>; rel=\"next\", \
         <{}/search/repositories?q=stars%3A%3E1000&per_page=2&page=5>; rel=\"last\"",
        server.uri(),
        server.uri()
    );

    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", next.as_str())
                .set_body_json(page_json(&[
                    repo_json(10, "acme/rocket", 90_000),
                    repo_json(11, "acme/engine", 80_000),
                ])),
        )
        .mount(&server)
        .await;

    let page = test_client(&server, None)
        .search_page(&query(), 1)
        .await
        .expect("search_page failed");

    assert!(page.has_more);
    assert_eq!(page.repositories.len(), 2);
    let first = &page.repositories[0];
    assert_eq!(first.identity.repo_id, 10);
    assert_eq!(first.identity.name, "rocket");
    assert_eq!(first.identity.url, "https://github.com/acme/rocket");
    assert_eq!(first.stats.stars, 90_000);
    assert_eq!(first.stats.forks, 9_000);
}

#[tokio::test]
async fn last_page_without_link_has_no_more() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_json(&[repo_json(1, "a/b", 1500)])),
        )
        .mount(&server)
        .await;

    let page = test_client(&server, None)
        .search_page(&query(), 5)
        .await
        .expect("search_page failed");

    assert!(!page.has_more);
    assert_eq!(page.repositories.len(), 1);
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_429_is_rate_limited_with_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client(&server, None)
        .search_repositories(&query(), 1)
        .await
        .unwrap_err();

    assert!(
        matches!(err, GithubError::RateLimited { retry_after_secs: 30 }),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn status_403_with_exhausted_budget_maps_to_source_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("x-ratelimit-remaining", "0")
                .insert_header("retry-after", "120")
                .set_body_json(json!({"message": "API rate limit exceeded"})),
        )
        .mount(&server)
        .await;

    let err = test_client(&server, None)
        .search_page(&query(), 1)
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            SourceError::RateLimited {
                retry_after_secs: 120
            }
        ),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn server_error_maps_to_source_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server, None);
    let raw = client.search_repositories(&query(), 1).await.unwrap_err();
    assert!(matches!(
        raw,
        GithubError::UnexpectedStatus { status: 503, .. }
    ));
}

#[tokio::test]
async fn non_json_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server, None)
        .search_repositories(&query(), 1)
        .await
        .unwrap_err();

    assert!(matches!(err, GithubError::Deserialize { .. }));
}

#[tokio::test]
async fn negative_count_cuts_page_after_the_valid_prefix() {
    let server = MockServer::start().await;
    let mut bad = repo_json(7, "acme/broken", 2000);
    bad["stargazers_count"] = json!(-1);

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_json(&[
                    repo_json(6, "acme/fine", 3000),
                    bad,
                    repo_json(8, "acme/after", 1500),
                ]))
                .insert_header(
                    "link",
                    "<https://api.github.com/search/repositories?page=2>; rel=\"next\"",
                ),
        )
        .mount(&server)
        .await;

    let page = test_client(&server, None)
        .search_page(&query(), 1)
        .await
        .expect("page with a bad record still returns its valid prefix");

    let names: Vec<&str> = page
        .repositories
        .iter()
        .map(|r| r.identity.full_name.as_str())
        .collect();
    assert_eq!(names, ["acme/fine"]);
    assert!(
        matches!(page.trailing_error, Some(SourceError::Malformed(_))),
        "unexpected: {:?}",
        page.trailing_error
    );
}

#[tokio::test]
async fn unreachable_server_is_unavailable() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let client = GithubClient::with_base_url(None, 2, "ghtrend-test/0.1", &uri).unwrap();
    let err = client.search_page(&query(), 1).await.unwrap_err();

    assert!(matches!(err, SourceError::Unavailable(_)), "unexpected: {err:?}");
}
