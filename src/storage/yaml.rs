//! YAML catalog store
//!
//! The catalog lives in a single YAML document. Besides the current
//! `{schema, stories, pending}` shape, two older shapes are accepted on load:
//! the `{schema: 1, items: [...]}` item list, which is migrated into stories, and an
//! intermediate top-level list, which loads as an empty catalog.

use crate::catalog::{migrate_legacy_items, Catalog, LegacyItem};
use crate::storage::traits::{CatalogStore, StorageError, StorageResult};
use crate::storage::{read_text_lossy, write_if_changed};
use crate::url::PublisherTable;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Catalog store backed by a YAML file
pub struct YamlCatalogStore {
    path: PathBuf,
    publishers: PublisherTable,
}

impl YamlCatalogStore {
    /// Creates a store for `path`
    ///
    /// The publisher table is only consulted when migrating legacy items that carry no
    /// source.
    pub fn new(path: impl Into<PathBuf>, publishers: PublisherTable) -> Self {
        Self {
            path: path.into(),
            publishers,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn malformed(&self, reason: impl Into<String>) -> StorageError {
        StorageError::MalformedCatalog {
            path: self.path.display().to_string(),
            reason: reason.into(),
        }
    }

    /// Parses catalog text in any of the accepted shapes
    pub fn parse(&self, text: &str) -> StorageResult<Catalog> {
        if text.trim().is_empty() {
            return Ok(Catalog::default());
        }

        let value: Value =
            serde_yaml::from_str(text).map_err(|e| self.malformed(e.to_string()))?;

        match value {
            Value::Null => Ok(Catalog::default()),
            Value::Sequence(_) => {
                warn!(
                    "{} holds a bare list, starting from an empty catalog",
                    self.path.display()
                );
                Ok(Catalog::default())
            }
            Value::Mapping(map) if map.get("stories").map(Value::is_sequence).unwrap_or(false) => {
                self.parse_current(map)
            }
            Value::Mapping(map) if map.get("items").map(Value::is_sequence).unwrap_or(false) => {
                Ok(self.migrate_items(map))
            }
            _ => Err(self.malformed("expected a mapping with a 'stories' list")),
        }
    }

    fn parse_current(&self, mut map: Mapping) -> StorageResult<Catalog> {
        // A missing or null queue is an empty one
        if !map.get("pending").map(Value::is_sequence).unwrap_or(true) {
            map.remove("pending");
        }
        if map.get("schema").map(Value::is_null).unwrap_or(false) {
            map.remove("schema");
        }

        serde_yaml::from_value(Value::Mapping(map)).map_err(|e| self.malformed(e.to_string()))
    }

    fn migrate_items(&self, mut map: Mapping) -> Catalog {
        let raw = match map.remove("items") {
            Some(Value::Sequence(items)) => items,
            _ => Vec::new(),
        };

        let items: Vec<LegacyItem> = raw
            .into_iter()
            .filter(Value::is_mapping)
            .filter_map(|item| serde_yaml::from_value(item).ok())
            .collect();

        let stories = migrate_legacy_items(items, &self.publishers);
        info!(
            "Migrated legacy catalog {}: {} stories",
            self.path.display(),
            stories.len()
        );

        Catalog {
            stories,
            ..Catalog::default()
        }
    }

    /// Renders a catalog as it is written to disk
    pub fn render(catalog: &Catalog) -> StorageResult<String> {
        let mut canonical = catalog.clone();
        canonical.canonicalize();
        Ok(serde_yaml::to_string(&canonical)?)
    }
}

impl CatalogStore for YamlCatalogStore {
    fn load(&self) -> StorageResult<Catalog> {
        match read_text_lossy(&self.path)? {
            Some(text) => self.parse(&text),
            None => Ok(Catalog::default()),
        }
    }

    fn save(&self, catalog: &Catalog) -> StorageResult<bool> {
        let text = Self::render(catalog)?;
        write_if_changed(&self.path, &text)
    }
}
