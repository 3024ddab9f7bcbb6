//! Web scraper module for the FA Full-Time results service
//!
//! Provides the HTTP client, request pacing, URL builders and HTML parsers.

pub mod client;
pub mod parsers;
pub mod rate_limiter;

pub use client::{HttpClient, PageFetcher};
pub use rate_limiter::RateLimiter;

use crate::config::SourceConfig;

/// Build fixture detail URL
/// URL: {base}/displayFixture.html?id=FIXTUREID
pub fn fixture_url(base_url: &str, fixture_id: &str) -> String {
    format!("{}/displayFixture.html?id={}", base_url, fixture_id)
}

/// Query string shared by the results and fixtures listings
fn listing_query(source: &SourceConfig) -> String {
    format!(
        "selectedSeason={season}&selectedFixtureGroupAgeGroup=0&previousSelectedFixtureGroupAgeGroup=\
         &selectedFixtureGroupKey={key}&previousSelectedFixtureGroupKey={key}&selectedDateCode=all\
         &selectedRelatedFixtureOption=3&selectedClub=&previousSelectedClub=&selectedTeam=",
        season = source.season,
        key = source.fixture_group_key,
    )
}

/// Build paginated results listing URL
/// URL: {base}/results/PAGE/SIZE.html?...
pub fn results_url(source: &SourceConfig, page: u32, page_size: u32) -> String {
    format!(
        "{}/results/{}/{}.html?{}",
        source.base_url,
        page,
        page_size,
        listing_query(source)
    )
}

/// Build paginated upcoming fixtures listing URL
/// URL: {base}/fixtures/PAGE/SIZE.html?...
pub fn fixtures_url(source: &SourceConfig, page: u32, page_size: u32) -> String {
    format!(
        "{}/fixtures/{}/{}.html?{}&selectedFixtureDateStatus=&selectedFixtureStatus=0",
        source.base_url,
        page,
        page_size,
        listing_query(source)
    )
}

/// Build league table URL
pub fn table_url(source: &SourceConfig) -> String {
    format!(
        "{}/table.html?selectedSeason={}&selectedDivision={}",
        source.base_url, source.season, source.division
    )
}
