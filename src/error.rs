//! Error types for fetching, parsing and storing scraped data.

use thiserror::Error;

/// Failure while synchronizing a single page or fixture.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure or non-success HTTP status.
    #[error("fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    /// The document was reachable but cannot be used.
    #[error("unparseable document at {url}: {message}")]
    Parse { url: String, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure talking to the appearance / match store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Some player rows of a fixture could not be written; the whole fixture
    /// was rolled back.
    #[error("{failed} of {total} appearances for fixture {fixture_id} failed to write")]
    PartialWrite {
        fixture_id: String,
        failed: usize,
        total: usize,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn fetch(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn parse(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            url: url.into(),
            message: message.to_string(),
        }
    }
}
