mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use ghtrend_collector::{Collector, CollectorSettings};
use ghtrend_db::{PgSnapshotStore, SnapshotStore, TrendEngine, TrendWindows};
use ghtrend_github::GithubClient;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ghtrend_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::info!(env = %config.env, bind_addr = %config.bind_addr, "starting ghtrend-server");

    let pool_config = ghtrend_db::PoolConfig::from_app_config(&config);
    let pool = ghtrend_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = ghtrend_db::run_migrations(&pool).await?;
    if applied > 0 {
        tracing::info!(applied, "applied pending migrations");
    }

    let store: Arc<dyn SnapshotStore> = Arc::new(PgSnapshotStore::new(pool));
    let engine = TrendEngine::new(Arc::clone(&store), TrendWindows::from_app_config(&config));

    let mut job_scheduler = if config.collector_enabled {
        let source = Arc::new(GithubClient::from_app_config(&config)?);
        let collector = Arc::new(Collector::new(
            source,
            Arc::clone(&store),
            CollectorSettings::from_app_config(&config),
        ));
        Some(scheduler::build_scheduler(collector, config.collect_interval).await?)
    } else {
        tracing::info!("background collection disabled");
        None
    };

    let app = build_app(AppState { engine, store });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(job_scheduler) = job_scheduler.as_mut() {
        if let Err(e) = job_scheduler.shutdown().await {
            tracing::warn!(error = %e, "scheduler did not shut down cleanly");
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
