//! fulltime-sync
//!
//! Scrapes an FA Full-Time league into SQLite: results, upcoming fixtures,
//! the division table and per-player appearances from fixture pages.

mod cli;
mod config;
mod error;
mod retry;
mod scraper;
mod storage;
mod sync;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands, Listing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fulltime_sync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::SyncResults => cli::run_listing(cli.db, cli.delay, Listing::Results).await,
        Commands::SyncFixtures => cli::run_listing(cli.db, cli.delay, Listing::Fixtures).await,
        Commands::SyncTable => cli::run_listing(cli.db, cli.delay, Listing::Table).await,
        Commands::SyncAppearances { fixture_id, format } => {
            cli::run_sync_appearances(cli.db, cli.delay, fixture_id, format).await
        }
        Commands::Sync { format } => cli::run_sync(cli.db, cli.delay, format).await,
        Commands::Status => cli::run_status(cli.db),
    }
}
