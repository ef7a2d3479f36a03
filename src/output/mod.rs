//! Output module for side-output CSVs and run reports
//!
//! This module handles:
//! - The review CSV and the snapshot queue CSV written by enrichment
//! - The index CSV written by the snapshot import
//! - Run and catalog statistics

mod queue;
mod review;
pub mod stats;

pub use queue::{
    render_snapshot_index_csv, render_snapshot_queue_csv, SnapshotQueueRow,
    SNAPSHOT_INDEX_HEADER, SNAPSHOT_QUEUE_HEADER,
};
pub use review::{
    read_review_csv, render_review_csv, stabilize_checked_at, ReviewRow, REVIEW_HEADER,
};
pub use stats::{print_catalog_statistics, print_run_summary, CatalogStatistics, RunSummary};

/// In-memory CSV writer with `\n` line endings; headers are written explicitly so
/// empty outputs still carry them
fn csv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}
