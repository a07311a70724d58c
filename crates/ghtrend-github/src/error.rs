use thiserror::Error;

use ghtrend_core::SourceError;

#[derive(Debug, Error)]
pub enum GithubError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by GitHub (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid GitHub API base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error("malformed repository {repo_id}: {reason}")]
    Malformed { repo_id: i64, reason: String },
}

impl From<GithubError> for SourceError {
    fn from(err: GithubError) -> Self {
        match err {
            GithubError::RateLimited { retry_after_secs } => {
                SourceError::RateLimited { retry_after_secs }
            }
            GithubError::Malformed { .. } | GithubError::Deserialize { .. } => {
                SourceError::Malformed(err.to_string())
            }
            GithubError::Http(_)
            | GithubError::UnexpectedStatus { .. }
            | GithubError::InvalidBaseUrl { .. } => SourceError::Unavailable(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_keeps_retry_hint() {
        let source: SourceError = GithubError::RateLimited {
            retry_after_secs: 42,
        }
        .into();
        assert!(matches!(
            source,
            SourceError::RateLimited {
                retry_after_secs: 42
            }
        ));
    }

    #[test]
    fn server_error_is_unavailable() {
        let source: SourceError = GithubError::UnexpectedStatus {
            status: 502,
            url: "https://api.github.com/search/repositories".to_string(),
        }
        .into();
        match source {
            SourceError::Unavailable(message) => assert!(message.contains("502")),
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }

    #[test]
    fn malformed_record_is_malformed() {
        let source: SourceError = GithubError::Malformed {
            repo_id: 7,
            reason: "negative stargazers_count".to_string(),
        }
        .into();
        assert!(matches!(source, SourceError::Malformed(_)));
    }
}
