//! Incremental appearance synchronization.
//!
//! A fixture is extracted only when it is finished and has no stored
//! appearances. Each fixture's appearances are written as one unit, so an
//! interrupted run is resumed simply by running again.

use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::scraper::parsers::{Appearance, LineupParser};
use crate::scraper::{fixture_url, PageFetcher, RateLimiter};
use crate::storage::{AppearanceStore, Fixture};

/// Scores that mean "no result yet", compared lowercase with whitespace removed
pub const UNFINISHED_SCORES: &[&str] = &["vs", "v", "tbc", "p-p", "pp", "postponed"];

/// Whether a fixture's score is a real result
pub fn is_finished(score: &str) -> bool {
    let normalized: String = score
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();

    !normalized.is_empty() && !UNFINISHED_SCORES.contains(&normalized.as_str())
}

/// Finished fixtures, in input order
pub fn select_finished(fixtures: &[Fixture]) -> Vec<&Fixture> {
    fixtures.iter().filter(|f| is_finished(&f.score)).collect()
}

/// A fixture that could not be recorded this run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureFailure {
    pub fixture_id: String,
    pub error: String,
}

/// Outcome of one synchronization run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Finished fixtures examined
    pub scanned: usize,
    /// Fixtures already holding appearances
    pub skipped: usize,
    /// Fixtures whose appearances were written this run
    pub processed: usize,
    /// Fixtures whose page yielded no players (no published line-up)
    pub empty: usize,
    pub failed: usize,
    /// Distinct appearance rows stored this run
    pub appearances: usize,
    pub failures: Vec<FixtureFailure>,
}

impl SyncReport {
    fn record_failure(&mut self, fixture: &Fixture, error: &Error) {
        warn!(fixture_id = %fixture.fixture_id, error = %error, "fixture failed");
        self.failed += 1;
        self.failures.push(FixtureFailure {
            fixture_id: fixture.fixture_id.clone(),
            error: error.to_string(),
        });
    }
}

/// Drives fetch -> extract -> store for fixtures lacking appearances
pub struct SyncController<'a, F: PageFetcher, S: AppearanceStore> {
    fetcher: &'a F,
    store: &'a S,
    limiter: RateLimiter,
    base_url: String,
}

impl<'a, F: PageFetcher, S: AppearanceStore> SyncController<'a, F, S> {
    pub fn new(fetcher: &'a F, store: &'a S, limiter: RateLimiter, base_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            store,
            limiter,
            base_url: base_url.into(),
        }
    }

    /// Process every finished fixture that has no stored appearances.
    ///
    /// Per-fixture failures are recorded in the report and never stop the run.
    pub async fn run(&self, fixtures: &[Fixture]) -> SyncReport {
        let finished = select_finished(fixtures);
        let mut report = SyncReport {
            scanned: finished.len(),
            ..Default::default()
        };

        let mut pending = Vec::new();
        for fixture in finished {
            match self.store.has_appearances(&fixture.fixture_id) {
                Ok(true) => report.skipped += 1,
                Ok(false) => pending.push(fixture),
                Err(e) => report.record_failure(fixture, &e.into()),
            }
        }

        let interval = self.limiter.interval().await;
        info!(
            scanned = report.scanned,
            skipped = report.skipped,
            pending = pending.len(),
            interval = ?interval,
            "selected unprocessed fixtures"
        );

        for fixture in pending {
            self.process(fixture, &mut report).await;
        }

        info!(
            processed = report.processed,
            empty = report.empty,
            failed = report.failed,
            "appearance sync complete"
        );
        report
    }

    /// Extract and store one fixture regardless of its score or stored state
    pub async fn run_single(&self, fixture: &Fixture) -> SyncReport {
        let mut report = SyncReport {
            scanned: 1,
            ..Default::default()
        };
        self.process(fixture, &mut report).await;
        report
    }

    /// Fetch a fixture page and extract its appearances without storing them
    pub async fn extract(&self, fixture: &Fixture) -> Result<Vec<Appearance>> {
        let url = fixture_url(&self.base_url, &fixture.fixture_id);

        self.limiter.acquire().await;
        info!(
            fixture_id = %fixture.fixture_id,
            "fetching {} vs {}",
            fixture.home_team,
            fixture.away_team
        );
        let fetched = self.fetcher.fetch_page(&url).await;
        self.limiter.release().await;
        let html = fetched?;

        Ok(LineupParser::parse(
            &html,
            &fixture.fixture_id,
            &fixture.home_team,
            &fixture.away_team,
        ))
    }

    async fn process(&self, fixture: &Fixture, report: &mut SyncReport) {
        let appearances = match self.extract(fixture).await {
            Ok(appearances) => appearances,
            Err(e) => return report.record_failure(fixture, &e),
        };

        if appearances.is_empty() {
            info!(fixture_id = %fixture.fixture_id, "no lineup published");
            report.empty += 1;
            return;
        }

        // Rows are keyed by name, so a repeated name overwrites the earlier entry
        let distinct = appearances
            .iter()
            .map(|a| a.player_name.as_str())
            .collect::<HashSet<_>>()
            .len();
        if distinct < appearances.len() {
            warn!(
                fixture_id = %fixture.fixture_id,
                players = appearances.len(),
                distinct,
                "duplicate player names, later entries replace earlier ones"
            );
        }

        match self
            .store
            .upsert_fixture_appearances(&fixture.fixture_id, &appearances)
        {
            Ok(written) => {
                debug!(fixture_id = %fixture.fixture_id, written, distinct, "stored appearances");
                report.processed += 1;
                report.appearances += distinct;
            }
            Err(e) => report.record_failure(fixture, &e.into()),
        }
    }
}
