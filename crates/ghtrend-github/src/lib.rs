pub mod client;
pub mod error;
pub mod normalize;
pub mod pagination;
pub mod source;
pub mod types;

pub use client::{GithubClient, SearchResult};
pub use error::GithubError;
pub use normalize::normalize_repository;
pub use types::{GithubRepository, SearchResponse};
