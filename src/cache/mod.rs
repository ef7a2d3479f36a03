//! Head cache module
//!
//! Keeps a minimized copy of every cleanly fetched page head so metadata survives
//! later bot blocks, and imports manually captured snapshots into the same store.

mod head_cache;
mod snapshot;

pub use head_cache::{build_head_document, HeadCache, HEAD_SUFFIX, KEY_LEN};
pub use snapshot::{
    import_snapshot, import_snapshots, snapshot_files, SnapshotNote, SnapshotRow,
};
