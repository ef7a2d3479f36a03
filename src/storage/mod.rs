//! Storage module for persisting catalog data
//!
//! This module handles everything the pipeline reads from or writes to disk:
//! - the YAML catalog store, including legacy shape migration
//! - change-aware file writes, so unchanged outputs are never rewritten
//! - the input URL list

mod files;
mod input;
mod traits;
mod yaml;

pub use files::{read_text_lossy, write_if_changed};
pub use input::read_input_urls;
pub use traits::{CatalogStore, StorageError, StorageResult};
pub use yaml::YamlCatalogStore;
