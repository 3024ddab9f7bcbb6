//! Results listing parser
//!
//! URL: {base}/results/PAGE/SIZE.html?...
//!
//! Every played match is anchored on a `div.score-col`; its parent row holds
//! the team, date and competition columns.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::LazyLock;

use super::{clean_text, COUNTY_CUP, COUNTY_CUP_ABBR};
use crate::storage::Fixture;

static SCORE_COL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.score-col").unwrap());
static EXPAND_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href*='expandFixtureID=']").unwrap());
static HOME_COL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.home-team-col").unwrap());
static AWAY_COL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.road-team-col").unwrap());
static TEAM_NAME: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.team-name").unwrap());
static DATE_SPAN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.datetime-col span").unwrap());
static TYPE_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.type-col a").unwrap());
static CUP_NAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.fg-col p.smaller").unwrap());
static EXPAND_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"expandFixtureID=([^#&]+)").unwrap());

/// Competition label for rows without a type column
pub const DEFAULT_COMPETITION: &str = "League/Cup";

/// One parsed results page
#[derive(Debug, Default)]
pub struct ResultsPage {
    pub fixtures: Vec<Fixture>,
    /// Number of score columns on the page; zero means pagination is over
    pub score_columns: usize,
}

/// Parser for results listing pages
pub struct ResultsParser;

impl ResultsParser {
    pub fn parse(html: &str, competitions: &HashMap<String, String>) -> ResultsPage {
        let document = Html::parse_document(html);
        let mut page = ResultsPage::default();

        for score_col in document.select(&SCORE_COL) {
            page.score_columns += 1;

            let Some(row) = score_col.parent().and_then(ElementRef::wrap) else {
                continue;
            };
            if let Some(fixture) = Self::parse_row(&row, &score_col, competitions) {
                page.fixtures.push(fixture);
            }
        }

        page
    }

    fn parse_row(
        row: &ElementRef,
        score_col: &ElementRef,
        competitions: &HashMap<String, String>,
    ) -> Option<Fixture> {
        let href = row.select(&EXPAND_LINK).next()?.value().attr("href")?;
        let fixture_id = EXPAND_ID.captures(href)?[1].to_string();

        let home_col = row.select(&HOME_COL).next()?;
        let away_col = row.select(&AWAY_COL).next()?;

        let team_name = |col: ElementRef| {
            col.select(&TEAM_NAME)
                .next()
                .map(|e| clean_text(&e))
                .unwrap_or_else(|| "Unknown".to_string())
        };

        let date = row
            .select(&DATE_SPAN)
            .next()
            .map(|e| clean_text(&e))
            .unwrap_or_else(|| "Unknown".to_string());

        Some(Fixture::new(
            fixture_id,
            Self::competition(row, competitions),
            team_name(home_col),
            team_name(away_col),
            date,
            clean_text(score_col),
        ))
    }

    /// County cup rows carry the cup's full name separately
    fn competition(row: &ElementRef, competitions: &HashMap<String, String>) -> String {
        let Some(link) = row.select(&TYPE_LINK).next() else {
            return DEFAULT_COMPETITION.to_string();
        };
        let abbr = clean_text(&link);

        if abbr == COUNTY_CUP_ABBR {
            return row
                .select(&CUP_NAME)
                .next()
                .map(|e| clean_text(&e))
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| COUNTY_CUP.to_string());
        }

        competitions.get(&abbr).cloned().unwrap_or(abbr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
<div class="results-list">
  <div class="fixture-row">
    <div class="type-col"><a href="/x">YMD2</a></div>
    <div class="datetime-col"><span>06/09/25 14:00</span></div>
    <div class="home-team-col"><div class="team-name">Hampsthwaite FC</div></div>
    <div class="score-col">3 - 1</div>
    <div class="road-team-col"><div class="team-name">Road Rovers</div></div>
    <a href="/results.html?expandFixtureID=29646093#fixture">More</a>
  </div>
  <div class="fixture-row">
    <div class="type-col"><a href="/x">CC</a></div>
    <div class="fg-col"><p class="smaller">West Riding County Cup</p></div>
    <div class="datetime-col"><span>13/09/25</span></div>
    <div class="home-team-col"><div class="team-name">Cup Town</div></div>
    <div class="score-col">P - P</div>
    <div class="road-team-col"><div class="team-name">Hampsthwaite FC</div></div>
    <a href="/results.html?expandFixtureID=29646100">More</a>
  </div>
  <div class="fixture-row">
    <div class="type-col"><a href="/x">CC</a></div>
    <div class="home-team-col"><div class="team-name">A</div></div>
    <div class="score-col">0 - 0</div>
    <div class="road-team-col"><div class="team-name">B</div></div>
    <a href="?expandFixtureID=29646101">More</a>
  </div>
  <div class="fixture-row">
    <div class="type-col"><a href="/x">XYZ</a></div>
    <div class="home-team-col"></div>
    <div class="score-col">2 - 2</div>
    <div class="road-team-col"><div class="team-name">D</div></div>
    <a href="?expandFixtureID=29646102">More</a>
  </div>
  <div class="fixture-row">
    <div class="score-col">1 - 0</div>
  </div>
</div>
</body>
</html>"#;

    fn aliases() -> HashMap<String, String> {
        HashMap::from([("YMD2".to_string(), "York League Div 2".to_string())])
    }

    #[test]
    fn test_parse_results() {
        let page = ResultsParser::parse(SAMPLE_HTML, &aliases());
        assert_eq!(page.score_columns, 5);
        assert_eq!(page.fixtures.len(), 4);

        let first = &page.fixtures[0];
        assert_eq!(first.fixture_id, "29646093");
        assert_eq!(first.competition, "York League Div 2");
        assert_eq!(first.home_team, "Hampsthwaite FC");
        assert_eq!(first.away_team, "Road Rovers");
        assert_eq!(first.date, "06/09/25 14:00");
        assert_eq!(first.score, "3 - 1");
        assert!(first.kickoff.is_some());
    }

    #[test]
    fn test_county_cup_names() {
        let page = ResultsParser::parse(SAMPLE_HTML, &aliases());
        assert_eq!(page.fixtures[1].competition, "West Riding County Cup");
        assert_eq!(page.fixtures[1].score, "P - P");
        assert_eq!(page.fixtures[2].competition, "County Cup");
        assert_eq!(page.fixtures[2].date, "Unknown");
    }

    #[test]
    fn test_unknown_abbreviation_and_missing_team_name() {
        let page = ResultsParser::parse(SAMPLE_HTML, &aliases());
        let last = &page.fixtures[3];
        assert_eq!(last.competition, "XYZ");
        assert_eq!(last.home_team, "Unknown");
        assert_eq!(last.away_team, "D");
    }

    #[test]
    fn test_empty_page_ends_pagination() {
        let page = ResultsParser::parse("<html><body>No results</body></html>", &aliases());
        assert_eq!(page.score_columns, 0);
        assert!(page.fixtures.is_empty());
    }
}
