//! URL handling module
//!
//! This module provides URL string normalization, link resolution against a page URL,
//! host extraction, and the publisher table that maps hosts to source names.

mod domain;
mod normalize;
mod publisher;

pub use domain::{extract_host, host_matches};
pub use normalize::{https_variant, normalize_url, resolve_link};
pub use publisher::{PublisherRule, PublisherTable, BUILTIN_PUBLISHERS};
