//! SQLite schema definitions
//!
//! Tables:
//! - matches: Fixtures and results, keyed by the source's fixture id
//! - appearances: One row per player per fixture
//! - league_table: Current division standings

use rusqlite::{Connection, Result};

/// Create all tables in the database
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS matches (
            fixture_id TEXT PRIMARY KEY,
            competition TEXT NOT NULL,
            home_team TEXT NOT NULL,
            away_team TEXT NOT NULL,
            date_text TEXT NOT NULL,
            kickoff TEXT,
            score TEXT NOT NULL,
            updated_at TEXT DEFAULT (datetime('now'))
        )
        "#,
        [],
    )?;

    // Presence of any row for a fixture marks it as processed
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS appearances (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            fixture_id TEXT NOT NULL,
            player_name TEXT NOT NULL,
            team_name TEXT NOT NULL,
            is_starter INTEGER NOT NULL,
            goals INTEGER NOT NULL DEFAULT 0,
            goal_minutes TEXT,
            sub_on_minutes TEXT,
            sub_off_minutes TEXT,
            yellow_cards INTEGER NOT NULL DEFAULT 0,
            red_cards INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT DEFAULT (datetime('now')),
            UNIQUE(fixture_id, player_name)
        )
        "#,
        [],
    )?;

    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS league_table (
            team_name TEXT PRIMARY KEY,
            position INTEGER NOT NULL,
            played INTEGER NOT NULL,
            home_w INTEGER NOT NULL,
            home_d INTEGER NOT NULL,
            home_l INTEGER NOT NULL,
            home_f INTEGER NOT NULL,
            home_a INTEGER NOT NULL,
            away_w INTEGER NOT NULL,
            away_d INTEGER NOT NULL,
            away_l INTEGER NOT NULL,
            away_f INTEGER NOT NULL,
            away_a INTEGER NOT NULL,
            overall_w INTEGER NOT NULL,
            overall_d INTEGER NOT NULL,
            overall_l INTEGER NOT NULL,
            overall_f INTEGER NOT NULL,
            overall_a INTEGER NOT NULL,
            goal_difference INTEGER NOT NULL,
            points INTEGER NOT NULL,
            updated_at TEXT DEFAULT (datetime('now'))
        )
        "#,
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_appearances_fixture ON appearances(fixture_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_appearances_player ON appearances(player_name)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_matches_kickoff ON matches(kickoff)",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_create_tables() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        let count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN
                 ('matches', 'appearances', 'league_table')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_create_tables_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();
    }

    #[test]
    fn test_appearance_key_unique() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();

        let insert = "INSERT INTO appearances (fixture_id, player_name, team_name, is_starter)
                      VALUES ('F1', 'A. Smith', 'Home', 1)";
        conn.execute(insert, []).unwrap();
        assert!(conn.execute(insert, []).is_err());
    }
}
