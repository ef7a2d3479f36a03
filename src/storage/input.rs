use crate::storage::{StorageError, StorageResult};
use crate::url::normalize_url;
use std::collections::HashSet;
use std::path::Path;

/// Reads the input URL list
///
/// The CSV must have a header row with a `url` column; other columns are ignored.
/// URLs are normalized, blank ones skipped, and duplicates dropped in first-seen order.
/// `max` truncates the result.
pub fn read_input_urls(path: &Path, max: Option<usize>) -> StorageResult<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let column = reader
        .headers()?
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("url"))
        .ok_or_else(|| StorageError::MissingColumn {
            path: path.display().to_string(),
            column: "url".to_string(),
        })?;

    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    for record in reader.records() {
        let record = record?;
        let url = normalize_url(record.get(column).unwrap_or(""));
        if url.is_empty() || !seen.insert(url.clone()) {
            continue;
        }
        urls.push(url);
    }

    if let Some(max) = max {
        urls.truncate(max);
    }

    Ok(urls)
}
