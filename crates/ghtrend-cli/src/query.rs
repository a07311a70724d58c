use std::sync::Arc;

use chrono::{DateTime, Utc};
use ghtrend_core::{AppConfig, RepoId};
use ghtrend_db::{DbError, SnapshotStore, TrendEngine, TrendWindows, TrendingRow};

use crate::TrendingView;

const DESCRIPTION_WIDTH: usize = 60;

/// Print the daily or weekly trending table.
///
/// # Errors
///
/// Returns an error if `limit` is not positive or the store query fails.
pub(crate) async fn run_trending(
    config: &AppConfig,
    store: Arc<dyn SnapshotStore>,
    view: TrendingView,
    limit: Option<i64>,
) -> anyhow::Result<()> {
    let limit = limit.unwrap_or(config.trending_limit);
    if limit < 1 {
        anyhow::bail!("--limit must be at least 1, got {limit}");
    }
    let windows = TrendWindows {
        limit,
        ..TrendWindows::from_app_config(config)
    };
    let engine = TrendEngine::new(store, windows);

    let rows = match view {
        TrendingView::Daily => engine.daily_trending().await?,
        TrendingView::Weekly => engine.weekly_trending().await?,
    };

    if rows.is_empty() {
        println!("no repositories sampled in the window; run `collect` first");
        return Ok(());
    }

    print_trending(&rows, view);
    Ok(())
}

fn print_trending(rows: &[TrendingRow], view: TrendingView) {
    match view {
        TrendingView::Daily => {
            println!("{:<6}{:<10}{:<9}REPOSITORY", "RANK", "STARS", "FORKS");
        }
        TrendingView::Weekly => {
            println!(
                "{:<6}{:<10}{:<10}{:<9}REPOSITORY",
                "RANK", "GROWTH", "STARS", "FORKS"
            );
        }
    }

    for (rank, row) in rows.iter().enumerate() {
        let rank = rank + 1;
        match row.growth {
            Some(growth) if view == TrendingView::Weekly => println!(
                "{rank:<6}{:<10}{:<10}{:<9}{}",
                format!("+{growth}"),
                row.stars,
                row.forks,
                row.full_name
            ),
            _ => println!(
                "{rank:<6}{:<10}{:<9}{}",
                row.stars, row.forks, row.full_name
            ),
        }
    }
}

/// Print a repository's identity, newest counts, and history.
///
/// # Errors
///
/// Returns an error if the repository has no snapshots or the query fails.
pub(crate) async fn run_repo(
    config: &AppConfig,
    store: Arc<dyn SnapshotStore>,
    id: RepoId,
) -> anyhow::Result<()> {
    let engine = TrendEngine::new(store, TrendWindows::from_app_config(config));
    let detail = match engine.repository_detail(id).await {
        Ok(detail) => detail,
        Err(DbError::NotFound) => {
            anyhow::bail!("repository {id} has no snapshots; run `collect` first")
        }
        Err(e) => return Err(e.into()),
    };

    let repo = &detail.repository;
    println!("{} ({})", repo.full_name, repo.repo_id);
    if let Some(description) = repo.description.as_deref() {
        println!("{}", truncate(description, DESCRIPTION_WIDTH));
    }
    println!("{}", repo.url);
    println!(
        "stars {}  forks {}  watchers {}  as of {}",
        detail.latest.stars,
        detail.latest.forks,
        detail.latest.watchers,
        fmt_timestamp(detail.latest.collected_at)
    );
    println!();

    if detail.history.is_empty() {
        println!("no snapshots inside the history window");
        return Ok(());
    }

    println!("{:<18}{:<10}{:<9}WATCHERS", "COLLECTED", "STARS", "FORKS");
    for snapshot in &detail.history {
        println!(
            "{:<18}{:<10}{:<9}{}",
            fmt_timestamp(snapshot.collected_at),
            snapshot.stars,
            snapshot.forks,
            snapshot.watchers
        );
    }

    Ok(())
}

/// Print the most recent collection runs.
///
/// # Errors
///
/// Returns an error if the query fails.
pub(crate) async fn run_runs(store: &dyn SnapshotStore, limit: i64) -> anyhow::Result<()> {
    let runs = store.list_collection_runs(limit).await?;
    if runs.is_empty() {
        println!("no collection runs recorded");
        return Ok(());
    }

    println!(
        "{:<7}{:<11}{:<11}{:<18}{:<8}ERROR",
        "ID", "TRIGGER", "STATUS", "STARTED", "REPOS"
    );
    for run in &runs {
        println!(
            "{:<7}{:<11}{:<11}{:<18}{:<8}{}",
            run.id,
            run.trigger_source,
            run.status,
            fmt_timestamp(run.started_at),
            run.repositories_processed,
            error_cell(run.error_message.as_deref())
        );
    }

    Ok(())
}

pub(crate) fn error_cell(message: Option<&str>) -> String {
    message.map_or_else(|| "-".to_string(), |m| truncate(m, DESCRIPTION_WIDTH))
}

fn fmt_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

pub(crate) fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        format!("{}...", text.chars().take(width).collect::<String>())
    } else {
        text.to_string()
    }
}
