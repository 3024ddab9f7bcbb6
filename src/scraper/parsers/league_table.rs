//! League table parser.

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::warn;

use super::clean_text;
use crate::storage::LeagueTableRow;

static TABLE_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#fixed-col-table-container tbody tr").unwrap());
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

/// Position, team, played, 3 x W/D/L/F/A, goal difference, points
const TABLE_COLUMNS: usize = 20;

/// Parser for the division table page
pub struct LeagueTableParser;

impl LeagueTableParser {
    pub fn parse(html: &str) -> Vec<LeagueTableRow> {
        let document = Html::parse_document(html);

        document
            .select(&TABLE_ROW)
            .filter_map(|row| Self::parse_row(&row))
            .collect()
    }

    fn parse_row(row: &ElementRef) -> Option<LeagueTableRow> {
        let cells: Vec<String> = row.select(&CELL).map(|td| clean_text(&td)).collect();
        if cells.len() < TABLE_COLUMNS {
            return None;
        }

        let Some((counts, (goal_difference, points))) = Self::numbers(&cells) else {
            warn!(team = %cells[1], "skipping table row with non-numeric values");
            return None;
        };
        let [position, played, home_w, home_d, home_l, home_f, home_a, away_w, away_d, away_l, away_f, away_a, overall_w, overall_d, overall_l, overall_f, overall_a] =
            counts;

        Some(LeagueTableRow {
            position,
            team_name: cells[1].clone(),
            played,
            home_w,
            home_d,
            home_l,
            home_f,
            home_a,
            away_w,
            away_d,
            away_l,
            away_f,
            away_a,
            overall_w,
            overall_d,
            overall_l,
            overall_f,
            overall_a,
            goal_difference,
            points,
        })
    }

    /// Unsigned columns (all but team, goal difference and points) plus the signed pair
    fn numbers(cells: &[String]) -> Option<([u32; 17], (i32, i32))> {
        let mut unsigned = [0u32; 17];
        let columns = std::iter::once(0).chain(2..18);
        for (slot, idx) in unsigned.iter_mut().zip(columns) {
            *slot = cells[idx].parse().ok()?;
        }

        let goal_difference = cells[18].replace('+', "").parse().ok()?;
        let points = cells[19].parse().ok()?;

        Some((unsigned, (goal_difference, points)))
    }
}
