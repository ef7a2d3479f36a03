//! Enrichment pipeline
//!
//! For each input URL: fetch, block check, head cache write or read-back, metadata
//! extraction, story merge. The pending queue, review CSV and snapshot queue are side
//! outputs of the merge step. All I/O is sequential.

mod enricher;
mod state;

pub use enricher::Enricher;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::output::{ReviewRow, RunSummary, SnapshotQueueRow};
use chrono::{DateTime, Utc};

/// Source of the current time for catalog and CSV timestamps
pub type Clock = fn() -> DateTime<Utc>;

/// Everything an enrichment run produced
#[derive(Debug, Clone)]
pub struct EnrichOutcome {
    /// The catalog as written
    pub catalog: Catalog,

    /// Rows of the review CSV
    pub review_rows: Vec<ReviewRow>,

    /// Rows of the snapshot queue CSV
    pub snapshot_rows: Vec<SnapshotQueueRow>,

    /// Counters and write flags
    pub summary: RunSummary,
}

/// Runs enrichment with the given configuration
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `max` - Optional cap on the number of input URLs
pub async fn run_enrichment(config: &Config, max: Option<usize>) -> crate::Result<EnrichOutcome> {
    Enricher::new(config)?.run(max).await
}
