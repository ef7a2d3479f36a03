//! Configuration module for News-Catalog
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every setting has a default, so running without a file is supported.
//!
//! # Example
//!
//! ```no_run
//! use news_catalog::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("news.toml")).unwrap();
//! println!("Head cache lives in {}", config.paths.head_cache_dir);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, DetectConfig, FetchConfig, MarkerEntry, PathsConfig, PublisherEntry, SnapshotConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
