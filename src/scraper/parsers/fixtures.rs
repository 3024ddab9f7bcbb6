//! Upcoming fixtures listing parser
//!
//! URL: {base}/fixtures/PAGE/SIZE.html?...
//!
//! The fixtures listing is a plain table; a row is a fixture when it has
//! home, road and score cells and the home cell links to the fixture page.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::LazyLock;

use super::{clean_text, COUNTY_CUP, COUNTY_CUP_ABBR};
use crate::storage::Fixture;

static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static HOME_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td[class*='home-team']").unwrap());
static ROAD_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td[class*='road-team']").unwrap());
static SCORE_CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td.score").unwrap());
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static DIVIDER: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td.cell-divider").unwrap());
static SPAN: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").unwrap());
static FIXTURE_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[?&]id=([^&#]+)").unwrap());

/// Parser for upcoming fixtures pages
pub struct FixturesParser;

impl FixturesParser {
    /// Parse every fixture row on the page; an empty result ends pagination
    pub fn parse(html: &str, competitions: &HashMap<String, String>) -> Vec<Fixture> {
        let document = Html::parse_document(html);

        document
            .select(&ROW)
            .filter_map(|row| Self::parse_row(&row, competitions))
            .collect()
    }

    fn parse_row(row: &ElementRef, competitions: &HashMap<String, String>) -> Option<Fixture> {
        let home_cell = row.select(&HOME_CELL).next()?;
        let road_cell = row.select(&ROAD_CELL).next()?;
        let score_cell = row.select(&SCORE_CELL).next()?;

        let href = home_cell.select(&LINK).next()?.value().attr("href")?;
        let fixture_id = FIXTURE_ID.captures(href)?[1].to_string();

        let dividers: Vec<ElementRef> = row.select(&DIVIDER).collect();

        // Date and time are the first two spans of the second divider cell
        let date = dividers
            .get(1)
            .and_then(|cell| {
                let spans: Vec<String> = cell.select(&SPAN).map(|s| clean_text(&s)).collect();
                (spans.len() >= 2).then(|| format!("{} {}", spans[0], spans[1]))
            })
            .unwrap_or_else(|| "Unknown".to_string());

        let abbr = row
            .select(&CELL)
            .next()
            .map(|td| clean_text(&td))
            .unwrap_or_else(|| "Unknown".to_string());
        let full_name = if dividers.len() >= 3 {
            dividers.last().map(|cell| clean_text(cell))
        } else {
            None
        };

        Some(Fixture::new(
            fixture_id,
            Self::competition(&abbr, full_name.as_deref(), competitions),
            clean_text(&home_cell),
            clean_text(&road_cell),
            date,
            clean_text(&score_cell),
        ))
    }

    fn competition(
        abbr: &str,
        full_name: Option<&str>,
        competitions: &HashMap<String, String>,
    ) -> String {
        if let Some(name) = competitions.get(abbr) {
            return name.clone();
        }
        if abbr == COUNTY_CUP_ABBR {
            return COUNTY_CUP.to_string();
        }
        match full_name {
            Some(name) if !name.is_empty() && name != "Unknown" => name.to_string(),
            _ => abbr.to_string(),
        }
    }
}
