//! Listing synchronization: results, upcoming fixtures and the league table.
//!
//! Listing pages are retried with backoff; one that stays unreachable fails
//! the run. Individual rows that cannot be saved are logged and counted.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::retry::{retry, RetryConfig};
use crate::scraper::parsers::{FixturesParser, LeagueTableParser, ResultsParser};
use crate::scraper::{fixtures_url, results_url, table_url, PageFetcher, RateLimiter};
use crate::storage::{Fixture, MatchRepository};

/// Outcome of a listing sync
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListingReport {
    pub pages: u32,
    pub saved: usize,
    pub failed: usize,
}

/// Shared handles for listing syncs
pub struct ListingSync<'a, F: PageFetcher> {
    fetcher: &'a F,
    repo: &'a MatchRepository,
    limiter: RateLimiter,
    retry: RetryConfig,
    config: &'a AppConfig,
}

impl<'a, F: PageFetcher> ListingSync<'a, F> {
    pub fn new(
        fetcher: &'a F,
        repo: &'a MatchRepository,
        limiter: RateLimiter,
        retry: RetryConfig,
        config: &'a AppConfig,
    ) -> Self {
        Self {
            fetcher,
            repo,
            limiter,
            retry,
            config,
        }
    }

    /// Walk the results listing until a page has no score columns
    pub async fn sync_results(&self) -> Result<ListingReport> {
        let mut report = ListingReport::default();
        let scraper = &self.config.scraper;

        for page in 1..=scraper.max_pages {
            let url = results_url(&self.config.source, page, scraper.page_size);
            let html = self.fetch_listing(&url, "results page").await?;

            let parsed = ResultsParser::parse(&html, &self.config.source.competitions);
            if parsed.score_columns == 0 {
                break;
            }
            report.pages += 1;
            info!(page, results = parsed.fixtures.len(), "parsed results page");

            self.save_fixtures(&parsed.fixtures, &mut report);
        }

        info!(pages = report.pages, saved = report.saved, failed = report.failed, "results sync complete");
        Ok(report)
    }

    /// Walk the upcoming fixtures listing until a page has no fixture rows
    pub async fn sync_fixtures(&self) -> Result<ListingReport> {
        let mut report = ListingReport::default();
        let scraper = &self.config.scraper;

        for page in 1..=scraper.max_pages {
            let url = fixtures_url(&self.config.source, page, scraper.page_size);
            let html = self.fetch_listing(&url, "fixtures page").await?;

            let fixtures = FixturesParser::parse(&html, &self.config.source.competitions);
            if fixtures.is_empty() {
                break;
            }
            report.pages += 1;
            info!(page, fixtures = fixtures.len(), "parsed fixtures page");

            self.save_fixtures(&fixtures, &mut report);
        }

        info!(pages = report.pages, saved = report.saved, failed = report.failed, "fixtures sync complete");
        Ok(report)
    }

    /// Upsert every row of the current division table
    pub async fn sync_table(&self) -> Result<ListingReport> {
        let url = table_url(&self.config.source);
        let html = self.fetch_listing(&url, "league table").await?;

        let rows = LeagueTableParser::parse(&html);
        if rows.is_empty() {
            warn!(%url, "league table page has no rows");
        }

        let mut report = ListingReport {
            pages: 1,
            ..Default::default()
        };
        for row in &rows {
            match self.repo.upsert_table_row(row) {
                Ok(()) => report.saved += 1,
                Err(e) => {
                    warn!(team = %row.team_name, error = %e, "failed to save table row");
                    report.failed += 1;
                }
            }
        }

        info!(saved = report.saved, failed = report.failed, "league table sync complete");
        Ok(report)
    }

    async fn fetch_listing(&self, url: &str, label: &str) -> Result<String> {
        let fetcher = self.fetcher;
        let limiter = &self.limiter;

        retry(&self.retry, label, || async move {
            limiter.acquire().await;
            let fetched = fetcher.fetch_page(url).await;
            limiter.release().await;
            fetched
        })
        .await
        .with_context(|| format!("{} unreachable", label))
    }

    fn save_fixtures(&self, fixtures: &[Fixture], report: &mut ListingReport) {
        for fixture in fixtures {
            match self.repo.upsert_fixture(fixture) {
                Ok(()) => report.saved += 1,
                Err(e) => {
                    warn!(fixture_id = %fixture.fixture_id, error = %e, "failed to save fixture");
                    report.failed += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::client::fake::FakeFetcher;

    const RESULTS_PAGE: &str = r#"<html><body>
<div class="fixture-row">
  <div class="type-col"><a href="/x">YMD2</a></div>
  <div class="datetime-col"><span>06/09/25 14:00</span></div>
  <div class="home-team-col"><div class="team-name">Hampsthwaite FC</div></div>
  <div class="score-col">3 - 1</div>
  <div class="road-team-col"><div class="team-name">Road Rovers</div></div>
  <a href="/results.html?expandFixtureID=29646093">More</a>
</div>
<div class="fixture-row">
  <div class="type-col"><a href="/x">YMD2</a></div>
  <div class="datetime-col"><span>13/09/25 14:00</span></div>
  <div class="home-team-col"><div class="team-name">Road Rovers</div></div>
  <div class="score-col">P - P</div>
  <div class="road-team-col"><div class="team-name">Hampsthwaite FC</div></div>
  <a href="/results.html?expandFixtureID=29646094">More</a>
</div>
</body></html>"#;

    const EMPTY_PAGE: &str = "<html><body><p>No matches</p></body></html>";

    const FIXTURES_PAGE: &str = r#"<table><tr>
  <td class="cell-divider">YMD2</td>
  <td class="cell-divider"><span>28/02/26</span><span>14:00</span></td>
  <td class="home-team"><a href="/displayFixture.html?id=29700001">Hampsthwaite FC</a></td>
  <td class="score">VS</td>
  <td class="road-team">Road Rovers</td>
</tr></table>"#;

    fn table_page() -> String {
        let cells = [
            "1", "Hampsthwaite FC", "12", "4", "1", "1", "15", "6", "3", "2", "1", "10", "7", "7",
            "3", "2", "25", "13", "+12", "24",
        ];
        let tds: String = cells.iter().map(|c| format!("<td>{}</td>", c)).collect();
        format!(
            r#"<div id="fixed-col-table-container"><table><tbody><tr>{}</tr></tbody></table></div>"#,
            tds
        )
    }

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.source.base_url = "https://fulltime.test".to_string();
        config.scraper.page_size = 2;
        config.scraper.max_pages = 5;
        config
    }

    fn listing<'a>(fetcher: &'a FakeFetcher, repo: &'a MatchRepository, config: &'a AppConfig) -> ListingSync<'a, FakeFetcher> {
        ListingSync::new(fetcher, repo, RateLimiter::unlimited(), RetryConfig::none(), config)
    }

    #[tokio::test]
    async fn test_results_paginate_until_empty_page() {
        let config = test_config();
        let repo = MatchRepository::in_memory().unwrap();
        let fetcher = FakeFetcher::default()
            .with_page(results_url(&config.source, 1, 2), RESULTS_PAGE)
            .with_page(results_url(&config.source, 2, 2), EMPTY_PAGE);

        let report = listing(&fetcher, &repo, &config).sync_results().await.unwrap();

        assert_eq!(report, ListingReport { pages: 1, saved: 2, failed: 0 });
        assert_eq!(fetcher.request_count(), 2);

        let stored = repo.get_fixture("29646093").unwrap().unwrap();
        assert_eq!(stored.competition, "York League Div 2");
        assert_eq!(stored.score, "3 - 1");
        assert_eq!(repo.get_match_count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_results_stop_at_max_pages() {
        let mut config = test_config();
        config.scraper.max_pages = 2;
        let repo = MatchRepository::in_memory().unwrap();
        let fetcher = FakeFetcher::default()
            .with_page(results_url(&config.source, 1, 2), RESULTS_PAGE)
            .with_page(results_url(&config.source, 2, 2), RESULTS_PAGE)
            .with_page(results_url(&config.source, 3, 2), RESULTS_PAGE);

        let report = listing(&fetcher, &repo, &config).sync_results().await.unwrap();
        assert_eq!(report.pages, 2);
        assert_eq!(fetcher.request_count(), 2);
        // Same fixtures on both pages upsert onto the same rows
        assert_eq!(repo.get_match_count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_listing_fails_run() {
        let config = test_config();
        let repo = MatchRepository::in_memory().unwrap();
        let fetcher = FakeFetcher::default();

        let err = listing(&fetcher, &repo, &config).sync_results().await.unwrap_err();
        assert!(err.to_string().contains("results page unreachable"));
    }

    #[tokio::test]
    async fn test_fixtures_sync() {
        let config = test_config();
        let repo = MatchRepository::in_memory().unwrap();
        let fetcher = FakeFetcher::default()
            .with_page(fixtures_url(&config.source, 1, 2), FIXTURES_PAGE)
            .with_page(fixtures_url(&config.source, 2, 2), EMPTY_PAGE);

        let report = listing(&fetcher, &repo, &config).sync_fixtures().await.unwrap();
        assert_eq!(report.saved, 1);

        let upcoming = repo.get_fixture("29700001").unwrap().unwrap();
        assert_eq!(upcoming.score, "VS");
        assert_eq!(upcoming.date, "28/02/26 14:00");
    }

    #[tokio::test]
    async fn test_table_sync() {
        let config = test_config();
        let repo = MatchRepository::in_memory().unwrap();
        let fetcher = FakeFetcher::default().with_page(table_url(&config.source), table_page());

        let report = listing(&fetcher, &repo, &config).sync_table().await.unwrap();
        assert_eq!(report.saved, 1);

        let table = repo.get_league_table().unwrap();
        assert_eq!(table[0].team_name, "Hampsthwaite FC");
        assert_eq!(table[0].points, 24);
    }
}
