//! Leadsweep: a paced search-and-detail harvester for map listings
//!
//! This crate drives a browser session through partitioned search results,
//! deep-scrapes every unique listing it finds, and reconciles the extracted
//! records with a previously persisted CSV dataset.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod store;

use thiserror::Error;

/// Main error type for Leadsweep operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No partition keys supplied")]
    NoPartitions,

    #[error("Partition '{partition}' skipped: {source}")]
    Partition {
        partition: String,
        source: browser::BrowserError,
    },

    #[error("Extraction failed for {link}: {source}")]
    Extraction {
        link: String,
        source: browser::BrowserError,
    },

    #[error("Browser error: {0}")]
    Browser(#[from] browser::BrowserError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] store::StoreError),

    #[error("Crawl task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Leadsweep operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlJob, CrawlOrchestrator, CrawlRequest, CrawlSummary};
pub use state::RunPhase;
pub use store::{CsvRecordStore, Record, RecordMap, RecordStore};
