pub mod app_config;
pub mod config;
pub mod repository;
pub mod source;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use repository::{RepoId, RepositoryIdentity, RepositoryObservation, RepositoryStats};
pub use source::{RepositorySource, SearchQuery, SourceError, SourcePage};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{field} must be non-negative, got {value}")]
    NegativeStat { field: &'static str, value: i64 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
