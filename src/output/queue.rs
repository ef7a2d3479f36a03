//! Snapshot queue and snapshot index CSVs

use crate::cache::SnapshotRow;
use crate::output::{csv_writer, review::finish};
use serde::Serialize;

pub const SNAPSHOT_QUEUE_HEADER: [&str; 4] = ["url", "cache_path", "source", "reason"];

pub const SNAPSHOT_INDEX_HEADER: [&str; 5] = ["file", "extracted_url", "cache_path", "ok", "note"];

/// A blocked URL with no cached head, waiting for a manual snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotQueueRow {
    pub url: String,
    /// Where the imported snapshot's head will be looked up
    pub cache_path: String,
    pub source: String,
    /// Marker tokens, e.g. `captcha;body_too_small`
    pub reason: String,
}

/// Renders the snapshot queue
pub fn render_snapshot_queue_csv(rows: &[SnapshotQueueRow]) -> Result<String, csv::Error> {
    let mut writer = csv_writer();
    writer.write_record(SNAPSHOT_QUEUE_HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    finish(writer)
}

/// Renders the index written by the snapshot import
pub fn render_snapshot_index_csv(rows: &[SnapshotRow]) -> Result<String, csv::Error> {
    let mut writer = csv_writer();
    writer.write_record(SNAPSHOT_INDEX_HEADER)?;
    for row in rows {
        writer.write_record([
            row.file.as_str(),
            row.extracted_url.as_str(),
            row.cache_path.as_str(),
            if row.ok() { "true" } else { "false" },
            row.note.map(|n| n.as_str()).unwrap_or(""),
        ])?;
    }
    finish(writer)
}
