//! Storage traits and error types
//!
//! This module defines the trait interface for catalog stores and
//! associated error types.

use crate::catalog::Catalog;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed catalog {path}: {reason}")]
    MalformedCatalog { path: String, reason: String },

    #[error("Input CSV {path} has no '{column}' column")]
    MissingColumn { path: String, column: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for catalog storage backends
///
/// A store is read once at the start of a run and written once at the end.
pub trait CatalogStore {
    /// Loads the catalog
    ///
    /// A missing file is an empty catalog. Structurally invalid content is an error.
    fn load(&self) -> StorageResult<Catalog>;

    /// Saves the catalog
    ///
    /// # Returns
    ///
    /// `true` if anything was written, `false` if the stored content was already identical
    fn save(&self, catalog: &Catalog) -> StorageResult<bool>;
}
