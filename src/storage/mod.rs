//! SQLite storage module
//!
//! Persists fixtures/results, per-player appearances and the league table.

pub mod repository;
pub mod schema;

pub use repository::{AppearanceStore, Fixture, LeagueTableRow, MatchRepository};
