//! Snapshot import
//!
//! Turns manually saved full-page snapshots into head-cache entries, which is how an
//! operator resolves rows of the snapshot queue: save the page by hand, import it,
//! rerun enrichment.

use crate::cache::{build_head_document, HeadCache};
use crate::extract::best_url;
use crate::storage::{write_if_changed, StorageResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Why a snapshot file produced no cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotNote {
    ReadError,
    NoUrlInHead,
    NoHeadDoc,
}

impl SnapshotNote {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotNote::ReadError => "read_error",
            SnapshotNote::NoUrlInHead => "no_url_in_head",
            SnapshotNote::NoHeadDoc => "no_head_doc",
        }
    }
}

/// One row of the snapshot index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRow {
    pub file: String,
    pub extracted_url: String,
    pub cache_path: String,
    pub note: Option<SnapshotNote>,
}

impl SnapshotRow {
    pub fn ok(&self) -> bool {
        self.note.is_none()
    }
}

/// Lists `*.html` files of a directory in sorted order
///
/// A missing directory has no snapshots.
pub fn snapshot_files(input_dir: &Path) -> StorageResult<Vec<PathBuf>> {
    if !input_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files: Vec<PathBuf> = fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .map(|ext| ext.eq_ignore_ascii_case("html"))
                    .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Imports one snapshot file into the head cache
///
/// With `dry_run` the cache file is not written, but the row is still reported.
pub fn import_snapshot(path: &Path, cache: &HeadCache, dry_run: bool) -> StorageResult<SnapshotRow> {
    let mut row = SnapshotRow {
        file: path.display().to_string(),
        extracted_url: String::new(),
        cache_path: String::new(),
        note: None,
    };

    let html = match fs::read(path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            warn!("Failed to read snapshot {}: {}", path.display(), e);
            row.note = Some(SnapshotNote::ReadError);
            return Ok(row);
        }
    };

    // snapshots have no page URL, so only absolute head URLs count
    let Some(url) = best_url(&html, "") else {
        row.note = Some(SnapshotNote::NoUrlInHead);
        return Ok(row);
    };
    row.extracted_url = url.clone();

    let head = build_head_document(&html);
    if !head.to_lowercase().contains("<head") {
        row.note = Some(SnapshotNote::NoHeadDoc);
        return Ok(row);
    }

    let out_path = cache.path_for(&url);
    row.cache_path = out_path.display().to_string();

    if !dry_run {
        let wrote = write_if_changed(&out_path, &head)?;
        debug!("{} -> {} (changed: {})", row.file, row.cache_path, wrote);
    }

    Ok(row)
}

/// Imports every snapshot in `input_dir`
pub fn import_snapshots(
    input_dir: &Path,
    cache: &HeadCache,
    max: Option<usize>,
    dry_run: bool,
) -> StorageResult<Vec<SnapshotRow>> {
    let mut files = snapshot_files(input_dir)?;
    if let Some(max) = max {
        files.truncate(max);
    }

    let rows = files
        .iter()
        .map(|file| import_snapshot(file, cache, dry_run))
        .collect::<StorageResult<Vec<_>>>()?;

    info!(
        "Imported {} of {} snapshots from {}",
        rows.iter().filter(|r| r.ok()).count(),
        rows.len(),
        input_dir.display()
    );

    Ok(rows)
}
