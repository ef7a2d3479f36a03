//! News-Catalog: an "in the news" story ledger
//!
//! This crate fetches article URLs that mention an organization, extracts bylined-article
//! metadata, and maintains a deduplicated catalog of stories, one record per real-world
//! article, no matter how many URLs reach it.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod output;
pub mod pipeline;
pub mod storage;
pub mod text;
pub mod url;

use thiserror::Error;

/// Main error type for News-Catalog operations
///
/// Only structural problems end up here. A single URL that fails to fetch or parse
/// is recorded in the catalog's pending queue instead.
#[derive(Debug, Error)]
pub enum NewsError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

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

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// Result type alias for News-Catalog operations
pub type Result<T> = std::result::Result<T, NewsError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::{Catalog, Pending, Story};
pub use config::Config;
pub use pipeline::{run_enrichment, EnrichOutcome, Enricher};
