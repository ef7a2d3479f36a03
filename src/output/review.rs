//! Review CSV
//!
//! Rows for URLs that need a human look: terminal and transport failures, pages that
//! yielded no title or date, and non-200 fetches that were recovered from the cache.

use crate::output::csv_writer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

/// Header of the review CSV
pub const REVIEW_HEADER: [&str; 7] = [
    "id",
    "url",
    "final_url",
    "status_code",
    "checked_at",
    "title_guess",
    "notes",
];

/// One row of the review CSV
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRow {
    /// Story id when the URL was still attached to a story
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub final_url: String,
    /// Empty on transport failure
    #[serde(default)]
    pub status_code: String,
    #[serde(default)]
    pub checked_at: String,
    #[serde(default)]
    pub title_guess: String,
    #[serde(default)]
    pub notes: String,
}

type RowKey = (String, String, String, String, String, String);

impl ReviewRow {
    /// Status column value: the code, or empty for a transport failure
    pub fn status_text(status_code: u16) -> String {
        if status_code == 0 {
            String::new()
        } else {
            status_code.to_string()
        }
    }

    fn key(&self) -> RowKey {
        (
            self.id.clone(),
            self.url.clone(),
            self.final_url.clone(),
            self.status_code.clone(),
            self.title_guess.clone(),
            self.notes.clone(),
        )
    }
}

/// Renders review rows as CSV text (header always present, `\n` line endings)
pub fn render_review_csv(rows: &[ReviewRow]) -> Result<String, csv::Error> {
    let mut writer = csv_writer();
    writer.write_record(REVIEW_HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    finish(writer)
}

pub(crate) fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, csv::Error> {
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Reads the review CSV written by a previous run
///
/// Best effort: a missing file is empty, an unreadable one is logged and treated as empty.
pub fn read_review_csv(path: &Path) -> Vec<ReviewRow> {
    if !path.is_file() {
        return Vec::new();
    }

    let rows = csv::Reader::from_path(path).and_then(|mut reader| {
        reader
            .deserialize::<ReviewRow>()
            .collect::<Result<Vec<_>, _>>()
    });

    match rows {
        Ok(rows) => rows,
        Err(e) => {
            warn!("Ignoring unreadable review CSV {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Carries `checked_at` over from previous rows that are otherwise identical
///
/// Keeps the review CSV byte-identical across reruns that observe the same failures.
pub fn stabilize_checked_at(rows: &mut [ReviewRow], previous: &[ReviewRow]) {
    let previous: HashMap<RowKey, &str> = previous
        .iter()
        .filter(|r| !r.checked_at.is_empty())
        .map(|r| (r.key(), r.checked_at.as_str()))
        .collect();

    for row in rows {
        if let Some(checked_at) = previous.get(&row.key()) {
            row.checked_at = checked_at.to_string();
        }
    }
}
