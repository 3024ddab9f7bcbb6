//! HTML parsers for FA Full-Time pages.

pub mod appearance;
pub mod events;
pub mod fixtures;
pub mod league_table;
pub mod lineup;
pub mod results;

pub use appearance::{Appearance, AppearanceBuilder};
pub use events::{parse_marker, EventKind, EventToken};
pub use fixtures::FixturesParser;
pub use league_table::LeagueTableParser;
pub use lineup::LineupParser;
pub use results::ResultsParser;

use chrono::{NaiveDate, NaiveDateTime};
use scraper::ElementRef;

/// Abbreviation the service uses for county cup ties
pub const COUNTY_CUP_ABBR: &str = "CC";
pub const COUNTY_CUP: &str = "County Cup";

/// Element text with runs of whitespace collapsed to single spaces
pub(crate) fn clean_text(elem: &ElementRef) -> String {
    elem.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse the service's `dd/mm/yy [HH:MM]` date text
pub fn parse_kickoff(date_text: &str) -> Option<NaiveDateTime> {
    let text = date_text.trim();
    for format in ["%d/%m/%y %H:%M", "%d/%m/%Y %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    for format in ["%d/%m/%y", "%d/%m/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(text, format) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}
