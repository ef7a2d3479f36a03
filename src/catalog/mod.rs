//! Story catalog module
//!
//! This module owns the catalog's data model and its merge rules:
//! - [`Story`] and [`Pending`] records and the [`Catalog`] document
//! - fingerprints and date-based story ids
//! - primary-URL scoring
//! - the [`StoryIndex`] merge engine
//! - migration of the legacy item list

mod fingerprint;
mod ids;
mod legacy;
mod merge;
mod model;
mod reason;
mod scoring;

pub use fingerprint::{fingerprint_fields, story_fingerprint};
pub use ids::{allocate_story_id, date_key, id_suffix, UNKNOWN_DATE_KEY};
pub use legacy::{migrate_legacy_items, LegacyItem};
pub use merge::{MergeResult, Observation, StoryIndex};
pub use model::{Catalog, Pending, Story, SCHEMA_VERSION};
pub use reason::PendingReason;
pub use scoring::{primary_candidate, primary_url_score, rescore_primary, UrlContext};
