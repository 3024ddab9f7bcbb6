//! Synchronization drivers
//!
//! - `listings`: results, upcoming fixtures and the league table
//! - `appearances`: incremental per-player extraction from fixture pages

pub mod appearances;
pub mod listings;

pub use appearances::{is_finished, SyncController, SyncReport};
pub use listings::{ListingReport, ListingSync};
