//! CLI commands for fulltime-sync.
//!
//! Every command loads configuration, opens the SQLite store and shares one
//! rate limiter across all fetches of the run.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::AppConfig;
use crate::retry::RetryConfig;
use crate::scraper::parsers::Appearance;
use crate::scraper::{HttpClient, RateLimiter};
use crate::storage::{Fixture, MatchRepository};
use crate::sync::{is_finished, ListingReport, ListingSync, SyncController, SyncReport};

const UNKNOWN_HOME: &str = "Unknown Home";
const UNKNOWN_AWAY: &str = "Unknown Away";

#[derive(Parser)]
#[command(name = "fulltime-sync")]
#[command(version, about = "Scrape FA Full-Time results, fixtures, tables and player appearances", long_about = None)]
pub struct Cli {
    /// SQLite database path (overrides config)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Seconds between requests (overrides config)
    #[arg(long, global = true, value_name = "SECS")]
    pub delay: Option<f64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape the results listing into the matches table
    SyncResults,

    /// Scrape the upcoming fixtures listing into the matches table
    SyncFixtures,

    /// Scrape the division league table
    SyncTable,

    /// Extract player appearances for finished matches not yet processed
    SyncAppearances {
        /// Process only this fixture, ignoring score and stored state
        #[arg(long, value_name = "ID")]
        fixture_id: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Results, fixtures, table, then appearances
    Sync {
        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show stored counts
    Status,
}

/// Handles shared by every command of one run
struct Session {
    config: AppConfig,
    repo: MatchRepository,
    client: HttpClient,
    limiter: RateLimiter,
}

impl Session {
    fn open(db: Option<PathBuf>, delay: Option<f64>) -> Result<Self> {
        let mut config = AppConfig::load()?;
        if let Some(path) = db {
            config.storage.database_path = path.to_string_lossy().to_string();
        }
        if let Some(secs) = delay {
            config.scraper.request_delay_secs = secs;
        }

        let repo = MatchRepository::new(Path::new(&config.storage.database_path))?;
        let client = HttpClient::new(
            &config.source.user_agent,
            Duration::from_secs(config.scraper.timeout_secs),
        )?;
        let limiter = request_limiter(config.scraper.request_delay_secs)?;

        tracing::info!(
            database = %config.storage.database_path,
            delay_secs = config.scraper.request_delay_secs,
            "session opened"
        );

        Ok(Self {
            config,
            repo,
            client,
            limiter,
        })
    }

    fn listings(&self) -> ListingSync<'_, HttpClient> {
        ListingSync::new(
            &self.client,
            &self.repo,
            self.limiter.clone(),
            RetryConfig::default(),
            &self.config,
        )
    }

    fn controller(&self) -> SyncController<'_, HttpClient, MatchRepository> {
        SyncController::new(
            &self.client,
            &self.repo,
            self.limiter.clone(),
            self.config.source.base_url.clone(),
        )
    }

    async fn sync_appearances(&self, fixture_id: Option<String>) -> Result<SyncReport> {
        let controller = self.controller();

        match fixture_id {
            Some(id) => {
                let fixture = self.diagnostic_fixture(&id)?;
                Ok(controller.run_single(&fixture).await)
            }
            None => {
                let fixtures = self
                    .repo
                    .list_fixtures()
                    .context("Failed to enumerate fixtures")?;
                Ok(controller.run(&fixtures).await)
            }
        }
    }

    /// Stored fixture for `id`, or a placeholder with unknown team names
    fn diagnostic_fixture(&self, id: &str) -> Result<Fixture> {
        let stored = self
            .repo
            .get_fixture(id)
            .with_context(|| format!("Failed to look up fixture {}", id))?;

        Ok(stored.unwrap_or_else(|| {
            tracing::warn!(fixture_id = id, "fixture not stored, using placeholder team names");
            Fixture::new(id, "Unknown", UNKNOWN_HOME, UNKNOWN_AWAY, "Unknown", "")
        }))
    }
}

/// Limiter for the configured request delay; rejects values no `Duration` can hold
fn request_limiter(delay_secs: f64) -> Result<RateLimiter> {
    RateLimiter::from_secs_f64(delay_secs)
        .with_context(|| format!("Invalid request delay {} seconds", delay_secs))
}

/// Listing scraped by `run_listing`
#[derive(Clone, Copy, Debug)]
pub enum Listing {
    Results,
    Fixtures,
    Table,
}

/// Run one of the listing scrapers
pub async fn run_listing(db: Option<PathBuf>, delay: Option<f64>, listing: Listing) -> Result<()> {
    let session = Session::open(db, delay)?;
    let listings = session.listings();

    let (label, report) = match listing {
        Listing::Results => ("Results", listings.sync_results().await?),
        Listing::Fixtures => ("Fixtures", listings.sync_fixtures().await?),
        Listing::Table => ("League table", listings.sync_table().await?),
    };

    print_listing(label, &report);
    Ok(())
}

/// Run the appearance sync, or a single-fixture diagnostic
pub async fn run_sync_appearances(
    db: Option<PathBuf>,
    delay: Option<f64>,
    fixture_id: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let session = Session::open(db, delay)?;
    let report = session.sync_appearances(fixture_id.clone()).await?;
    print_report(&report, format)?;

    if let (Some(id), OutputFormat::Table) = (fixture_id, format) {
        print_stored_appearances(&session.repo.get_appearances(&id)?);
    }
    Ok(())
}

#[derive(Serialize)]
struct FullSyncReport {
    results: ListingReport,
    fixtures: ListingReport,
    table: ListingReport,
    appearances: SyncReport,
}

/// Run every stage in order: results, fixtures, table, appearances
pub async fn run_sync(db: Option<PathBuf>, delay: Option<f64>, format: OutputFormat) -> Result<()> {
    let session = Session::open(db, delay)?;
    let listings = session.listings();

    let report = FullSyncReport {
        results: listings.sync_results().await?,
        fixtures: listings.sync_fixtures().await?,
        table: listings.sync_table().await?,
        appearances: session.sync_appearances(None).await?,
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => {
            print_listing("Results", &report.results);
            print_listing("Fixtures", &report.fixtures);
            print_listing("League table", &report.table);
            print_appearance_table(&report.appearances);
        }
    }
    Ok(())
}

/// Print stored counts
pub fn run_status(db: Option<PathBuf>) -> Result<()> {
    let mut config = AppConfig::load()?;
    if let Some(path) = db {
        config.storage.database_path = path.to_string_lossy().to_string();
    }
    let repo = MatchRepository::new(Path::new(&config.storage.database_path))?;

    let fixtures = repo.list_fixtures()?;
    let finished = fixtures.iter().filter(|f| is_finished(&f.score)).count();

    println!("Database: {}", config.storage.database_path);
    println!("  Matches:           {:>6}", repo.get_match_count()?);
    println!("  Finished:          {:>6}", finished);
    println!("  With appearances:  {:>6}", repo.get_processed_fixture_count()?);
    println!("  Appearances:       {:>6}", repo.get_appearance_count()?);
    println!("  Table rows:        {:>6}", repo.get_table_row_count()?);

    let table = repo.get_league_table()?;
    if !table.is_empty() {
        println!();
        println!("=== League Table ===");
        for row in &table {
            println!(
                "  {:>2}. {:<28} P{:>3}  GD{:>4}  Pts{:>4}",
                row.position, row.team_name, row.played, row.goal_difference, row.points
            );
        }
    }
    Ok(())
}

fn print_listing(label: &str, report: &ListingReport) {
    println!(
        "{:<14} pages {:>3}  saved {:>5}  failed {:>3}",
        label, report.pages, report.saved, report.failed
    );
}

fn print_report(report: &SyncReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Table => print_appearance_table(report),
    }
    Ok(())
}

fn print_appearance_table(report: &SyncReport) {
    println!("=== Appearances ===");
    println!("  Finished fixtures:  {:>6}", report.scanned);
    println!("  Already processed:  {:>6}", report.skipped);
    println!("  Processed:          {:>6}", report.processed);
    println!("  No lineup:          {:>6}", report.empty);
    println!("  Failed:             {:>6}", report.failed);
    println!("  Appearances saved:  {:>6}", report.appearances);

    if !report.failures.is_empty() {
        println!();
        println!("=== Failures ===");
        for failure in &report.failures {
            println!("  {:>10}: {}", failure.fixture_id, failure.error);
        }
    }
}

fn print_stored_appearances(appearances: &[Appearance]) {
    println!();
    println!("=== Stored Appearances ===");
    for a in appearances {
        println!(
            "  {:<24} {:<24} {:<4} G{:>2} ({})  Y{} R{}  on {}  off {}",
            a.player_name,
            a.team_name,
            if a.is_starter { "XI" } else { "sub" },
            a.goals,
            a.goal_minutes.as_deref().unwrap_or("-"),
            a.yellow_cards,
            a.red_cards,
            a.sub_on_minutes.as_deref().unwrap_or("-"),
            a.sub_off_minutes.as_deref().unwrap_or("-"),
        );
    }
}
