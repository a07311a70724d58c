//! Offline tests for ghtrend-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use ghtrend_core::{AppConfig, Environment};
use ghtrend_db::{PoolConfig, TrendWindows, TrendingRow};

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        github_token: None,
        github_api_url: "https://api.github.com".to_string(),
        http_timeout_secs: 30,
        user_agent: "ua".to_string(),
        collect_interval: Duration::from_secs(60),
        fetch_throttle: Duration::from_millis(10),
        batch_cap: 5,
        min_stars: 10,
        page_size: 2,
        daily_window: chrono::Duration::hours(12),
        weekly_window: chrono::Duration::days(3),
        history_window: chrono::Duration::days(30),
        trending_limit: 25,
        collector_enabled: false,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn trend_windows_from_app_config_uses_configured_windows() {
    let windows = TrendWindows::from_app_config(&app_config());
    assert_eq!(windows.daily, chrono::Duration::hours(12));
    assert_eq!(windows.weekly, chrono::Duration::days(3));
    assert_eq!(windows.history, chrono::Duration::days(30));
    assert_eq!(windows.limit, 25);
}

#[test]
fn trend_windows_default_to_one_and_seven_days() {
    let windows = TrendWindows::default();
    assert_eq!(windows.daily, chrono::Duration::days(1));
    assert_eq!(windows.weekly, chrono::Duration::days(7));
    assert_eq!(windows.history, chrono::Duration::days(90));
    assert_eq!(windows.limit, 1000);
}

/// Compile-time smoke test: confirm that [`TrendingRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn trending_row_has_expected_fields() {
    let row = TrendingRow {
        repo_id: 10_270_250_i64,
        name: "react".to_string(),
        full_name: "facebook/react".to_string(),
        description: None,
        url: "https://github.com/facebook/react".to_string(),
        stars: 230_000_i64,
        forks: 47_000_i64,
        watchers: 230_000_i64,
        collected_at: chrono::Utc::now(),
        growth: Some(120_i64),
    };

    assert_eq!(row.repo_id, 10_270_250);
    assert_eq!(row.growth, Some(120));
    assert!(row.description.is_none());
}
