mod collect;
mod query;

use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use ghtrend_core::{AppConfig, RepoId};
use ghtrend_db::{PgSnapshotStore, SnapshotStore};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ghtrend-cli")]
#[command(about = "GitHub trending collector command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Collect one batch of repository snapshots from GitHub
    Collect {
        /// Keep collecting on the configured interval until Ctrl-C
        #[arg(long)]
        watch: bool,
    },
    /// Print a trending view
    Trending {
        #[arg(value_enum)]
        view: TrendingView,

        /// Maximum rows to print (defaults to the configured trending limit)
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Print one repository with its recent star history
    Repo {
        /// GitHub repository id
        id: RepoId,
    },
    /// Print recent collection runs, newest first
    Runs {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TrendingView {
    /// Most stars among repositories sampled in the daily window
    Daily,
    /// Largest star growth over the weekly window
    Weekly,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = ghtrend_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = ghtrend_db::PoolConfig::from_app_config(&config);
    let pool = ghtrend_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Migrate => {
            let applied = ghtrend_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::Collect { watch: false } => {
            collect::run_collect_once(&config, pg_store(pool)).await?;
        }
        Commands::Collect { watch: true } => {
            collect::run_collect_watch(&config, pg_store(pool)).await?;
        }
        Commands::Trending { view, limit } => {
            query::run_trending(&config, pg_store(pool), view, limit).await?;
        }
        Commands::Repo { id } => query::run_repo(&config, pg_store(pool), id).await?,
        Commands::Runs { limit } => query::run_runs(pg_store(pool).as_ref(), limit).await?,
    }

    Ok(())
}

fn pg_store(pool: sqlx::PgPool) -> Arc<dyn SnapshotStore> {
    Arc::new(PgSnapshotStore::new(pool))
}

/// Collector wired to the GitHub search API.
fn build_collector(
    config: &AppConfig,
    store: Arc<dyn SnapshotStore>,
) -> anyhow::Result<ghtrend_collector::Collector> {
    let source = Arc::new(ghtrend_github::GithubClient::from_app_config(config)?);
    Ok(ghtrend_collector::Collector::new(
        source,
        store,
        ghtrend_collector::CollectorSettings::from_app_config(config),
    ))
}

#[cfg(test)]
mod tests;
