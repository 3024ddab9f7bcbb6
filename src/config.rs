//! Configuration for fulltime-sync.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Results-service source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_season")]
    pub season: String,
    #[serde(default = "default_fixture_group_key")]
    pub fixture_group_key: String,
    #[serde(default = "default_division")]
    pub division: String,
    /// Competition abbreviation -> display name
    #[serde(default = "default_competitions")]
    pub competitions: HashMap<String, String>,
}

fn default_base_url() -> String {
    "https://fulltime.thefa.com".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)".to_string()
}

fn default_season() -> String {
    "9631242".to_string()
}

fn default_fixture_group_key() -> String {
    "1_419533493".to_string()
}

fn default_division() -> String {
    "368866241".to_string()
}

fn default_competitions() -> HashMap<String, String> {
    HashMap::from([
        ("YMD2".to_string(), "York League Div 2".to_string()),
        ("YFA".to_string(), "York League Cup".to_string()),
    ])
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            season: default_season(),
            fixture_group_key: default_fixture_group_key(),
            division: default_division(),
            competitions: default_competitions(),
        }
    }
}

/// Scraper pacing and pagination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Politeness interval between external fetches
    #[serde(default = "default_request_delay_secs")]
    pub request_delay_secs: f64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

fn default_request_delay_secs() -> f64 {
    2.0
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> u32 {
    100
}

fn default_max_pages() -> u32 {
    50
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            request_delay_secs: default_request_delay_secs(),
            timeout_secs: default_timeout_secs(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

fn default_database_path() -> String {
    "data/fulltime.db".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load configuration from defaults, an optional `config` file and the environment
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::with_name("config").required(false))
            // FULLTIME_SCRAPER__REQUEST_DELAY_SECS, FULLTIME_STORAGE__DATABASE_PATH, ...
            .add_source(
                config::Environment::with_prefix("FULLTIME")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
