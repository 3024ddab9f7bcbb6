//! SQLite repository for fixtures, appearances and the league table

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use std::path::Path;
use tracing::warn;

use super::schema::create_tables;
use crate::error::StoreError;
use crate::scraper::parsers::{parse_kickoff, Appearance};

const KICKOFF_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fixture or result as listed by the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fixture {
    pub fixture_id: String,
    pub competition: String,
    pub home_team: String,
    pub away_team: String,
    /// Date text as shown by the source, e.g. "28/02/26 14:00"
    pub date: String,
    pub kickoff: Option<NaiveDateTime>,
    /// Free text; "VS" or a postponement marker until the match is played
    pub score: String,
}

impl Fixture {
    pub fn new(
        fixture_id: impl Into<String>,
        competition: impl Into<String>,
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        date: impl Into<String>,
        score: impl Into<String>,
    ) -> Self {
        let date = date.into();
        Self {
            fixture_id: fixture_id.into(),
            competition: competition.into(),
            home_team: home_team.into(),
            away_team: away_team.into(),
            kickoff: parse_kickoff(&date),
            date,
            score: score.into(),
        }
    }
}

/// One row of the division table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LeagueTableRow {
    pub position: u32,
    pub team_name: String,
    pub played: u32,
    pub home_w: u32,
    pub home_d: u32,
    pub home_l: u32,
    pub home_f: u32,
    pub home_a: u32,
    pub away_w: u32,
    pub away_d: u32,
    pub away_l: u32,
    pub away_f: u32,
    pub away_a: u32,
    pub overall_w: u32,
    pub overall_d: u32,
    pub overall_l: u32,
    pub overall_f: u32,
    pub overall_a: u32,
    pub goal_difference: i32,
    pub points: i32,
}

/// Persistent home of appearance records.
///
/// At least one stored appearance for a fixture means the fixture has been
/// fully processed, so a fixture's appearances must be written all-or-nothing.
pub trait AppearanceStore {
    /// Does at least one appearance exist for the fixture?
    fn has_appearances(&self, fixture_id: &str) -> Result<bool, StoreError>;

    /// Insert or overwrite one appearance by (fixture_id, player_name)
    fn upsert_appearance(&self, appearance: &Appearance) -> Result<(), StoreError>;

    /// Write a complete fixture's appearances atomically.
    ///
    /// Every row is attempted; if any fails, nothing is kept and
    /// [`StoreError::PartialWrite`] is returned.
    fn upsert_fixture_appearances(
        &self,
        fixture_id: &str,
        appearances: &[Appearance],
    ) -> Result<usize, StoreError>;
}

/// Repository for scraped match data
pub struct MatchRepository {
    conn: Connection,
}

impl MatchRepository {
    /// Create a new repository, initializing the database if needed
    pub fn new(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).context("Failed to create database directory")?;
            }
        }

        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database {}", db_path.display()))?;

        create_tables(&conn).context("Failed to create tables")?;

        Ok(Self { conn })
    }

    /// Create an in-memory repository (for testing)
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        create_tables(&conn)?;
        Ok(Self { conn })
    }

    // ==================== Fixtures ====================

    /// Insert or update a fixture by id
    pub fn upsert_fixture(&self, fixture: &Fixture) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO matches
            (fixture_id, competition, home_team, away_team, date_text, kickoff, score)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(fixture_id) DO UPDATE SET
                competition = excluded.competition,
                home_team = excluded.home_team,
                away_team = excluded.away_team,
                date_text = excluded.date_text,
                kickoff = excluded.kickoff,
                score = excluded.score,
                updated_at = datetime('now')
            "#,
            params![
                fixture.fixture_id,
                fixture.competition,
                fixture.home_team,
                fixture.away_team,
                fixture.date,
                fixture.kickoff.map(|k| k.format(KICKOFF_FORMAT).to_string()),
                fixture.score,
            ],
        )?;
        Ok(())
    }

    pub fn get_fixture(&self, fixture_id: &str) -> Result<Option<Fixture>, StoreError> {
        let fixture = self
            .conn
            .query_row(
                r#"
                SELECT fixture_id, competition, home_team, away_team, date_text, kickoff, score
                FROM matches
                WHERE fixture_id = ?1
                "#,
                [fixture_id],
                fixture_from_row,
            )
            .optional()?;
        Ok(fixture)
    }

    /// All known fixtures, by kickoff (unknown dates last) then id
    pub fn list_fixtures(&self) -> Result<Vec<Fixture>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT fixture_id, competition, home_team, away_team, date_text, kickoff, score
            FROM matches
            ORDER BY kickoff IS NULL, kickoff, fixture_id
            "#,
        )?;

        let fixtures = stmt
            .query_map([], fixture_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(fixtures)
    }

    // ==================== Appearances ====================

    /// Stored appearances for a fixture, in insertion order
    pub fn get_appearances(&self, fixture_id: &str) -> Result<Vec<Appearance>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT fixture_id, player_name, team_name, is_starter, goals, goal_minutes,
                   sub_on_minutes, sub_off_minutes, yellow_cards, red_cards
            FROM appearances
            WHERE fixture_id = ?1
            ORDER BY id
            "#,
        )?;

        let appearances = stmt
            .query_map([fixture_id], |row| {
                Ok(Appearance {
                    fixture_id: row.get(0)?,
                    player_name: row.get(1)?,
                    team_name: row.get(2)?,
                    is_starter: row.get(3)?,
                    goals: row.get(4)?,
                    goal_minutes: row.get(5)?,
                    sub_on_minutes: row.get(6)?,
                    sub_off_minutes: row.get(7)?,
                    yellow_cards: row.get(8)?,
                    red_cards: row.get(9)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(appearances)
    }

    // ==================== League table ====================

    /// Insert or update a table row by team name
    pub fn upsert_table_row(&self, row: &LeagueTableRow) -> Result<(), StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO league_table
            (team_name, position, played,
             home_w, home_d, home_l, home_f, home_a,
             away_w, away_d, away_l, away_f, away_a,
             overall_w, overall_d, overall_l, overall_f, overall_a,
             goal_difference, points)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
            ON CONFLICT(team_name) DO UPDATE SET
                position = excluded.position,
                played = excluded.played,
                home_w = excluded.home_w,
                home_d = excluded.home_d,
                home_l = excluded.home_l,
                home_f = excluded.home_f,
                home_a = excluded.home_a,
                away_w = excluded.away_w,
                away_d = excluded.away_d,
                away_l = excluded.away_l,
                away_f = excluded.away_f,
                away_a = excluded.away_a,
                overall_w = excluded.overall_w,
                overall_d = excluded.overall_d,
                overall_l = excluded.overall_l,
                overall_f = excluded.overall_f,
                overall_a = excluded.overall_a,
                goal_difference = excluded.goal_difference,
                points = excluded.points,
                updated_at = datetime('now')
            "#,
            params![
                row.team_name,
                row.position,
                row.played,
                row.home_w,
                row.home_d,
                row.home_l,
                row.home_f,
                row.home_a,
                row.away_w,
                row.away_d,
                row.away_l,
                row.away_f,
                row.away_a,
                row.overall_w,
                row.overall_d,
                row.overall_l,
                row.overall_f,
                row.overall_a,
                row.goal_difference,
                row.points,
            ],
        )?;
        Ok(())
    }

    /// Current standings, by position
    pub fn get_league_table(&self) -> Result<Vec<LeagueTableRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT position, team_name, played,
                   home_w, home_d, home_l, home_f, home_a,
                   away_w, away_d, away_l, away_f, away_a,
                   overall_w, overall_d, overall_l, overall_f, overall_a,
                   goal_difference, points
            FROM league_table
            ORDER BY position, team_name
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok(LeagueTableRow {
                    position: row.get(0)?,
                    team_name: row.get(1)?,
                    played: row.get(2)?,
                    home_w: row.get(3)?,
                    home_d: row.get(4)?,
                    home_l: row.get(5)?,
                    home_f: row.get(6)?,
                    home_a: row.get(7)?,
                    away_w: row.get(8)?,
                    away_d: row.get(9)?,
                    away_l: row.get(10)?,
                    away_f: row.get(11)?,
                    away_a: row.get(12)?,
                    overall_w: row.get(13)?,
                    overall_d: row.get(14)?,
                    overall_l: row.get(15)?,
                    overall_f: row.get(16)?,
                    overall_a: row.get(17)?,
                    goal_difference: row.get(18)?,
                    points: row.get(19)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    // ==================== Counts ====================

    fn count(&self, sql: &str) -> Result<u64, StoreError> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub fn get_match_count(&self) -> Result<u64, StoreError> {
        self.count("SELECT COUNT(*) FROM matches")
    }

    pub fn get_appearance_count(&self) -> Result<u64, StoreError> {
        self.count("SELECT COUNT(*) FROM appearances")
    }

    /// Number of fixtures with at least one stored appearance
    pub fn get_processed_fixture_count(&self) -> Result<u64, StoreError> {
        self.count("SELECT COUNT(DISTINCT fixture_id) FROM appearances")
    }

    pub fn get_table_row_count(&self) -> Result<u64, StoreError> {
        self.count("SELECT COUNT(*) FROM league_table")
    }
}

impl AppearanceStore for MatchRepository {
    fn has_appearances(&self, fixture_id: &str) -> Result<bool, StoreError> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM appearances WHERE fixture_id = ?1)",
            [fixture_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn upsert_appearance(&self, appearance: &Appearance) -> Result<(), StoreError> {
        upsert_appearance_on(&self.conn, appearance)
    }

    fn upsert_fixture_appearances(
        &self,
        fixture_id: &str,
        appearances: &[Appearance],
    ) -> Result<usize, StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        let mut failed = 0;

        for appearance in appearances {
            if let Err(e) = upsert_appearance_on(&tx, appearance) {
                warn!(
                    fixture_id,
                    player = %appearance.player_name,
                    error = %e,
                    "failed to write appearance"
                );
                failed += 1;
            }
        }

        if failed > 0 {
            tx.rollback()?;
            return Err(StoreError::PartialWrite {
                fixture_id: fixture_id.to_string(),
                failed,
                total: appearances.len(),
            });
        }

        tx.commit()?;
        Ok(appearances.len())
    }
}

fn upsert_appearance_on(conn: &Connection, appearance: &Appearance) -> Result<(), StoreError> {
    conn.execute(
        r#"
        INSERT INTO appearances
        (fixture_id, player_name, team_name, is_starter, goals, goal_minutes,
         sub_on_minutes, sub_off_minutes, yellow_cards, red_cards)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        ON CONFLICT(fixture_id, player_name) DO UPDATE SET
            team_name = excluded.team_name,
            is_starter = excluded.is_starter,
            goals = excluded.goals,
            goal_minutes = excluded.goal_minutes,
            sub_on_minutes = excluded.sub_on_minutes,
            sub_off_minutes = excluded.sub_off_minutes,
            yellow_cards = excluded.yellow_cards,
            red_cards = excluded.red_cards,
            updated_at = datetime('now')
        "#,
        params![
            appearance.fixture_id,
            appearance.player_name,
            appearance.team_name,
            appearance.is_starter,
            appearance.goals,
            appearance.goal_minutes,
            appearance.sub_on_minutes,
            appearance.sub_off_minutes,
            appearance.yellow_cards,
            appearance.red_cards,
        ],
    )?;
    Ok(())
}

fn fixture_from_row(row: &Row) -> rusqlite::Result<Fixture> {
    let kickoff: Option<String> = row.get(5)?;
    Ok(Fixture {
        fixture_id: row.get(0)?,
        competition: row.get(1)?,
        home_team: row.get(2)?,
        away_team: row.get(3)?,
        date: row.get(4)?,
        kickoff: kickoff.and_then(|k| NaiveDateTime::parse_from_str(&k, KICKOFF_FORMAT).ok()),
        score: row.get(6)?,
    })
}
