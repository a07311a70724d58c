use std::net::SocketAddr;
use std::time::Duration;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

fn invalid(var: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: reason.into(),
    }
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let value = parse_u64(var, default)?;
        if value == 0 {
            return Err(invalid(var, "must be greater than zero"));
        }
        Ok(value)
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        match or_default(var, default).to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got \"{other}\""))),
        }
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("GHTREND_ENV", "development"))?;

    let bind_addr = or_default("GHTREND_BIND_ADDR", "0.0.0.0:8000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("GHTREND_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("GHTREND_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("GHTREND_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("GHTREND_DB_MIN_CONNECTIONS", "1")?;
    if db_min_connections > db_max_connections {
        return Err(invalid(
            "GHTREND_DB_MIN_CONNECTIONS",
            format!(
                "{db_min_connections} exceeds GHTREND_DB_MAX_CONNECTIONS ({db_max_connections})"
            ),
        ));
    }
    let db_acquire_timeout_secs = parse_u64("GHTREND_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let github_token = lookup("GITHUB_TOKEN").ok().filter(|t| !t.trim().is_empty());
    let github_api_url = or_default("GHTREND_GITHUB_API_URL", "https://api.github.com");
    let http_timeout_secs = parse_positive_u64("GHTREND_HTTP_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("GHTREND_USER_AGENT", "ghtrend/0.1 (trending-collector)");

    let collect_interval =
        Duration::from_secs(parse_positive_u64("GHTREND_COLLECT_INTERVAL_SECS", "21600")?);
    let fetch_throttle =
        Duration::from_millis(parse_positive_u64("GHTREND_FETCH_THROTTLE_MS", "1000")?);

    let batch_cap = usize::try_from(parse_positive_u64("GHTREND_BATCH_CAP", "1000")?)
        .map_err(|e| invalid("GHTREND_BATCH_CAP", e.to_string()))?;
    let min_stars = parse_u64("GHTREND_MIN_STARS", "1000")?;
    let page_size = parse_u32("GHTREND_PAGE_SIZE", "100")?;
    if !(1..=100).contains(&page_size) {
        return Err(invalid(
            "GHTREND_PAGE_SIZE",
            format!("{page_size} is outside 1..=100"),
        ));
    }

    let daily_window = hours(
        "GHTREND_DAILY_WINDOW_HOURS",
        parse_positive_u64("GHTREND_DAILY_WINDOW_HOURS", "24")?,
    )?;
    let weekly_window = days(
        "GHTREND_WEEKLY_WINDOW_DAYS",
        parse_positive_u64("GHTREND_WEEKLY_WINDOW_DAYS", "7")?,
    )?;
    let history_window = days(
        "GHTREND_HISTORY_WINDOW_DAYS",
        parse_positive_u64("GHTREND_HISTORY_WINDOW_DAYS", "90")?,
    )?;

    let trending_limit = i64::try_from(parse_positive_u64("GHTREND_TRENDING_LIMIT", "1000")?)
        .map_err(|e| invalid("GHTREND_TRENDING_LIMIT", e.to_string()))?;
    let collector_enabled = parse_bool("GHTREND_COLLECTOR_ENABLED", "true")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        github_token,
        github_api_url,
        http_timeout_secs,
        user_agent,
        collect_interval,
        fetch_throttle,
        batch_cap,
        min_stars,
        page_size,
        daily_window,
        weekly_window,
        history_window,
        trending_limit,
        collector_enabled,
    })
}

/// Upper bound for any trending or history window (about a century).
const MAX_WINDOW_DAYS: u64 = 36_500;

fn hours(var: &str, value: u64) -> Result<chrono::Duration, ConfigError> {
    if value > MAX_WINDOW_DAYS * 24 {
        return Err(invalid(
            var,
            format!("{value} hours exceeds the {MAX_WINDOW_DAYS}-day maximum"),
        ));
    }
    i64::try_from(value)
        .ok()
        .and_then(chrono::Duration::try_hours)
        .ok_or_else(|| invalid(var, format!("{value} hours is out of range")))
}

fn days(var: &str, value: u64) -> Result<chrono::Duration, ConfigError> {
    if value > MAX_WINDOW_DAYS {
        return Err(invalid(
            var,
            format!("{value} days exceeds the {MAX_WINDOW_DAYS}-day maximum"),
        ));
    }
    i64::try_from(value)
        .ok()
        .and_then(chrono::Duration::try_days)
        .ok_or_else(|| invalid(var, format!("{value} days is out of range")))
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(invalid(
            "GHTREND_ENV",
            format!("unknown environment \"{other}\""),
        )),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
