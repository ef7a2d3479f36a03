//! Metadata extraction module
//!
//! Parses HTML heads (live pages or cached head documents) into:
//! - [`HeadData`]: title, meta tags, canonical link and JSON-LD
//! - a best URL for the page, used as the head-cache key and primary-URL candidate
//! - [`ArticleMetadata`]: normalized title, byline, dates, source and teaser

mod head;
mod metadata;

pub use head::{best_url, find_article, HeadData};
pub(crate) use head::json_ld_scripts;
pub use metadata::{extract_metadata, ArticleMetadata};
