//! Fetch module
//!
//! Sequential HTTP fetching and classification of what came back:
//! - [`Fetcher`] performs the rate-limited GET and reports a [`FetchOutcome`]
//! - [`BlockDetector`] decides whether an HTML response is really a bot-block page

mod block;
mod fetcher;

pub use block::{
    is_html_content_type, BlockDetector, BlockMarker, BlockVerdict, BODY_TOO_SMALL,
    BUILTIN_MARKERS,
};
pub use fetcher::{build_http_client, media_type, FetchNote, FetchOutcome, Fetcher};
