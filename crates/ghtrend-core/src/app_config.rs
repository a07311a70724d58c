use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub github_token: Option<String>,
    pub github_api_url: String,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    pub collect_interval: Duration,
    /// Minimum spacing between two repository fetches within a run.
    pub fetch_throttle: Duration,
    /// Maximum repositories processed per run.
    pub batch_cap: usize,
    pub min_stars: u64,
    pub page_size: u32,
    pub daily_window: chrono::Duration,
    pub weekly_window: chrono::Duration,
    pub history_window: chrono::Duration,
    pub trending_limit: i64,
    /// Whether the server runs the background collection job.
    pub collector_enabled: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "github_token",
                &self.github_token.as_ref().map(|_| "[redacted]"),
            )
            .field("github_api_url", &self.github_api_url)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("collect_interval", &self.collect_interval)
            .field("fetch_throttle", &self.fetch_throttle)
            .field("batch_cap", &self.batch_cap)
            .field("min_stars", &self.min_stars)
            .field("page_size", &self.page_size)
            .field("daily_window", &self.daily_window)
            .field("weekly_window", &self.weekly_window)
            .field("history_window", &self.history_window)
            .field("trending_limit", &self.trending_limit)
            .field("collector_enabled", &self.collector_enabled)
            .finish()
    }
}
