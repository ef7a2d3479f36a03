//! Text normalization module
//!
//! Pure helpers shared by every other stage:
//! - Whitespace, entity and ASCII normalization
//! - Slugs and source keys
//! - Fingerprint text canonicalization
//! - Date recovery from timestamps and URL paths

mod dates;
mod normalize;

pub use dates::{date_from_time_text, date_from_url, is_iso_date, utc_timestamp};
pub use normalize::{
    decode_entities, keyify_source, looks_like_html, normalize_fingerprint_text, normalize_text,
    safe_ascii, slugify, teaser_truncate, title_from_url, TEASER_WORDS,
};
